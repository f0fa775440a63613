//! Leading portion of the main page.
//!
//! Everything after `<main>` is appended by the connection stream.

use axum::body::Bytes;

/// Page head with the connection counter placeholder and the post form
pub const PAGE_HEAD: &str = r#"<!doctype html>
<html>
<head>
<title>noscript timeline</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="stylesheet" type="text/css" href="/static/style.css">
</head>
<body>
<header>
	<div id="count">Being seen by <span id="nc"></span> connection(s)</div>
	<form method="post">
		<textarea name="msg" placeholder="Start typing..." autofocus></textarea>
		<div><button>Post</button></div>
	</form>
</header>
<main>
"#;

/// The page head as a chunk for the connection stream
pub fn preamble() -> Bytes {
    Bytes::from_static(PAGE_HEAD.as_bytes())
}
