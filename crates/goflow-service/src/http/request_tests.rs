//! Tests for request parsing.

use super::*;
use tokio::io::BufReader;

async fn parse_bytes(raw: &[u8]) -> Result<HttpRequest, HttpError> {
    let mut reader = BufReader::new(raw);
    HttpRequest::parse(&mut reader).await
}

// ============================================================================
// Request line
// ============================================================================

mod request_line_tests {
    use super::*;

    #[tokio::test]
    async fn test_parses_method_path_version() {
        let request = parse_bytes(b"GET /status HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/status");
    }

    /// Anything other than exactly three tokens is invalid.
    #[tokio::test]
    async fn test_wrong_token_count_rejected() {
        let err = parse_bytes(b"GET /status\r\n\r\n").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid HTTP request");

        let err = parse_bytes(b"GET  /status HTTP/1.1\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, HttpError::InvalidRequest));
    }

    #[tokio::test]
    async fn test_empty_stream_rejected() {
        let err = parse_bytes(b"").await.unwrap_err();
        assert!(matches!(err, HttpError::InvalidRequest));
    }
}

// ============================================================================
// Headers
// ============================================================================

mod header_tests {
    use super::*;

    /// Keys keep their received case; lookup is case-insensitive.
    #[tokio::test]
    async fn test_header_case_preserved_and_lookup_insensitive() {
        let request = parse_bytes(
            b"GET / HTTP/1.1\r\nX-GitHub-Event: push\r\nContent-Type: application/json\r\n\r\n",
        )
        .await
        .unwrap();

        assert!(request.headers.contains_key("X-GitHub-Event"));
        assert_eq!(request.header("x-github-event"), Some("push"));
        assert_eq!(request.header("X-Github-Event"), Some("push"));
        assert_eq!(request.content_type, "application/json");
    }

    /// Lines without a colon are ignored rather than fatal.
    #[tokio::test]
    async fn test_colonless_lines_ignored() {
        let request = parse_bytes(b"GET / HTTP/1.1\r\ngarbage line\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("Host"), Some("x"));
    }

    /// Whitespace around keys and values is trimmed.
    #[tokio::test]
    async fn test_whitespace_trimmed() {
        let request = parse_bytes(b"GET / HTTP/1.1\r\n  Host :  example.com  \r\n\r\n")
            .await
            .unwrap();
        assert_eq!(request.header("Host"), Some("example.com"));
    }
}

// ============================================================================
// Query strings
// ============================================================================

mod query_tests {
    use super::*;

    #[tokio::test]
    async fn test_query_pairs_split() {
        let request = parse_bytes(b"GET /products/query?prdid=1&prdname=iphone HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(request.path, "/products/query");
        assert_eq!(request.query("prdid"), Some("1"));
        assert_eq!(request.query("prdname"), Some("iphone"));
    }

    /// Malformed pairs are dropped silently.
    #[tokio::test]
    async fn test_malformed_pairs_dropped() {
        let request = parse_bytes(b"GET /q?ok=1&novalue&a=b=c HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(request.query_params.len(), 1);
        assert_eq!(request.query("ok"), Some("1"));
    }
}

// ============================================================================
// Bodies
// ============================================================================

mod body_tests {
    use super::*;

    #[tokio::test]
    async fn test_post_body_sized_by_content_length() {
        let request = parse_bytes(b"POST /webhook HTTP/1.1\r\nContent-Length: 4\r\n\r\nabcdEXTRA")
            .await
            .unwrap();
        assert_eq!(request.body, b"abcd");
    }

    /// A missing Content-Length yields an empty body.
    #[tokio::test]
    async fn test_missing_content_length_means_empty_body() {
        let request = parse_bytes(b"POST /webhook HTTP/1.1\r\n\r\nignored")
            .await
            .unwrap();
        assert!(request.body.is_empty());
    }

    /// GET requests never read a body.
    #[tokio::test]
    async fn test_get_never_reads_body() {
        let request = parse_bytes(b"GET /status HTTP/1.1\r\nContent-Length: 7\r\n\r\npayload")
            .await
            .unwrap();
        assert!(request.body.is_empty());
    }

    /// A Content-Length longer than the available data fails the read once
    /// the stream ends. (On a live socket this blocks instead; accepted.)
    #[tokio::test]
    async fn test_truncated_body_is_io_error() {
        let err = parse_bytes(b"POST /webhook HTTP/1.1\r\nContent-Length: 100\r\n\r\nshort")
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Io(_)));
    }
}

// ============================================================================
// Body interpretation
// ============================================================================

mod parse_body_tests {
    use super::*;

    #[tokio::test]
    async fn test_json_body() {
        let request = parse_bytes(
            b"POST / HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 13\r\n\r\n{\"price\": 42}",
        )
        .await
        .unwrap();
        match request.parse_body().unwrap() {
            ParsedBody::Json(value) => assert_eq!(value["price"], 42),
            other => panic!("expected JSON body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_text_body() {
        let request = parse_bytes(
            b"POST / HTTP/1.1\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello",
        )
        .await
        .unwrap();
        match request.parse_body().unwrap() {
            ParsedBody::Text(text) => assert_eq!(text, "hello"),
            other => panic!("expected text body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_content_type_rejected() {
        let request = parse_bytes(
            b"POST / HTTP/1.1\r\nContent-Type: application/xml\r\nContent-Length: 3\r\n\r\n<x>",
        )
        .await
        .unwrap();
        let err = request.parse_body().unwrap_err();
        assert!(matches!(err, HttpError::UnsupportedContentType(_)));
    }
}
