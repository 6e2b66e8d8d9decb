use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use reqwest::Url;
use tracing::debug;

use super::error::AuthError;

const SUCCESS_PAGE: &str = "<html><head><title>tunecard</title></head>\
<body style=\"font-family: sans-serif; text-align: center; padding: 50px; background: #191414; color: white;\">\
<h1 style=\"color: #1DB954;\">&#x2713; Authorization successful</h1>\
<p>You can close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "<html><head><title>tunecard</title></head>\
<body style=\"font-family: sans-serif; text-align: center; padding: 50px; background: #191414; color: white;\">\
<h1 style=\"color: #ff0000;\">&#x2717; Authorization failed</h1>\
<p>No authorization code received.</p></body></html>";

/// What a single request to the redirect URI carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Code(String),
    Denied(String),
    Missing,
}

/// Interpret an HTTP request line such as `GET /callback?code=abc HTTP/1.1`.
pub fn parse_callback(request_line: &str) -> CallbackOutcome {
    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let Ok(url) = Url::parse("http://localhost").and_then(|base| base.join(target)) else {
        return CallbackOutcome::Missing;
    };

    let mut code = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match (code, error) {
        (Some(code), _) => CallbackOutcome::Code(code),
        (None, Some(error)) => CallbackOutcome::Denied(error),
        (None, None) => CallbackOutcome::Missing,
    }
}

/// Listen on the redirect URI's address until the browser delivers a code.
pub fn wait_for_code(redirect_uri: &str, timeout: Duration) -> Result<String, AuthError> {
    let url = Url::parse(redirect_uri).map_err(|e| AuthError::InvalidUrl(e.to_string()))?;
    let host = url.host_str().unwrap_or("127.0.0.1").to_string();
    let port = url.port_or_known_default().unwrap_or(8888);

    let listener = TcpListener::bind((host.as_str(), port))?;
    listener.set_nonblocking(true)?;

    let started = Instant::now();
    let deadline = started.checked_add(timeout).unwrap_or(started);
    while Instant::now() < deadline {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!(%peer, "callback connection");
                if let Some(code) = answer(stream)? {
                    return Ok(code);
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AuthError::Timeout(timeout))
}

fn answer(mut stream: TcpStream) -> Result<Option<String>, AuthError> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    // Drain the headers so closing the socket does not reset the connection.
    let mut header = String::new();
    while reader.read_line(&mut header)? > 2 {
        header.clear();
    }
    let outcome = parse_callback(&request_line);

    let (status, body) = match outcome {
        CallbackOutcome::Code(_) => ("200 OK", SUCCESS_PAGE),
        _ => ("400 Bad Request", FAILURE_PAGE),
    };
    write!(
        stream,
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )?;
    stream.flush()?;

    match outcome {
        CallbackOutcome::Code(code) => Ok(Some(code)),
        CallbackOutcome::Denied(reason) => Err(AuthError::Denied(reason)),
        CallbackOutcome::Missing => Ok(None),
    }
}
