use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::distributed::protocol::ErrorResponse;
use crate::error::WorkerError;

/// Largest request (headers plus body) the worker accepts.
const MAX_REQUEST_BYTES: usize = 1024 * 1024;

pub(super) struct HttpRequest {
    pub(super) method: String,
    pub(super) path: String,
    pub(super) body: Vec<u8>,
}

/// A failure answered with an HTTP status instead of a result.
#[derive(Debug)]
pub(super) struct RequestError {
    pub(super) status: u16,
    pub(super) message: String,
}

impl RequestError {
    pub(super) fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

pub(super) async fn read_http_request(socket: &mut TcpStream) -> Result<HttpRequest, RequestError> {
    let mut buffer: Vec<u8> = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    let header_end;

    loop {
        let bytes = socket
            .read(&mut chunk)
            .await
            .map_err(|err| RequestError::new(400, format!("Failed to read request: {}", err)))?;
        if bytes == 0 {
            return Err(RequestError::new(400, "Empty request"));
        }
        let read_slice = chunk
            .get(..bytes)
            .ok_or_else(|| RequestError::new(400, "Invalid read length"))?;
        buffer.extend_from_slice(read_slice);
        if buffer.len() > MAX_REQUEST_BYTES {
            return Err(RequestError::new(413, "Request too large"));
        }
        if let Some(pos) = find_header_end(&buffer) {
            header_end = pos;
            break;
        }
    }

    let header_bytes = buffer
        .get(..header_end)
        .ok_or_else(|| RequestError::new(400, "Malformed request headers"))?;
    let header_text = std::str::from_utf8(header_bytes)
        .map_err(|err| RequestError::new(400, format!("Invalid request encoding: {}", err)))?;
    let mut lines = header_text.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| RequestError::new(400, "Missing request line"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| RequestError::new(400, "Missing HTTP method"))?;
    let path = parts
        .next()
        .ok_or_else(|| RequestError::new(400, "Missing request path"))?;

    let mut content_length = 0usize;
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(RequestError::new(400, "Malformed header"));
        };
        if key.trim().eq_ignore_ascii_case("content-length") {
            content_length = value
                .trim()
                .parse::<usize>()
                .map_err(|err| RequestError::new(400, format!("Invalid Content-Length: {}", err)))?;
        }
    }
    if content_length > MAX_REQUEST_BYTES {
        return Err(RequestError::new(413, "Request body too large"));
    }

    let body_start = header_end
        .checked_add(4)
        .ok_or_else(|| RequestError::new(400, "Malformed request headers"))?;
    let mut body = buffer.get(body_start..).unwrap_or_default().to_vec();
    while body.len() < content_length {
        let bytes = socket
            .read(&mut chunk)
            .await
            .map_err(|err| RequestError::new(400, format!("Failed to read body: {}", err)))?;
        if bytes == 0 {
            break;
        }
        let read_slice = chunk
            .get(..bytes)
            .ok_or_else(|| RequestError::new(400, "Invalid read length"))?;
        body.extend_from_slice(read_slice);
    }
    if body.len() < content_length {
        return Err(RequestError::new(400, "Request body truncated"));
    }
    body.truncate(content_length);

    Ok(HttpRequest {
        method: method.to_owned(),
        path: path.to_owned(),
        body,
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

const fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

pub(super) async fn write_json_response<T>(
    socket: &mut TcpStream,
    status: u16,
    response: &T,
) -> Result<(), WorkerError>
where
    T: Serialize,
{
    let body = serde_json::to_vec(response).map_err(|err| WorkerError::Serialize {
        context: "worker response",
        source: err,
    })?;
    write_response(socket, status, &body).await
}

pub(super) async fn write_error_response(
    socket: &mut TcpStream,
    status: u16,
    message: &str,
) -> Result<(), WorkerError> {
    let body = serde_json::to_vec(&ErrorResponse {
        ok: false,
        error: message,
    })
    .map_err(|err| WorkerError::Serialize {
        context: "worker error response",
        source: err,
    })?;
    write_response(socket, status, &body).await
}

async fn write_response(socket: &mut TcpStream, status: u16, body: &[u8]) -> Result<(), WorkerError> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        status_text(status),
        body.len()
    );
    socket
        .write_all(head.as_bytes())
        .await
        .map_err(|err| WorkerError::Io {
            context: "write worker response",
            source: err,
        })?;
    socket.write_all(body).await.map_err(|err| WorkerError::Io {
        context: "write worker response body",
        source: err,
    })?;
    socket.flush().await.map_err(|err| WorkerError::Io {
        context: "flush worker response",
        source: err,
    })?;
    Ok(())
}
