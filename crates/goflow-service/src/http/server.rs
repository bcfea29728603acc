//! TCP accept loop and per-connection request handling.

use crate::http::context::HttpContext;
use crate::http::request::HttpRequest;
use crate::http::response::status_text;
use crate::http::router::{Handler, Resolution, Router};
use crate::responses::respond_json;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

/// The HTTP server: a bind address plus its route table.
pub struct HttpServer {
    addr: String,
    router: Router,
}

impl HttpServer {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            router: Router::new(),
        }
    }

    pub fn get(&mut self, path: &str, handler: Arc<dyn Handler>) {
        self.router.get(path, handler);
    }

    pub fn post(&mut self, path: &str, handler: Arc<dyn Handler>) {
        self.router.post(path, handler);
    }

    pub fn put(&mut self, path: &str, handler: Arc<dyn Handler>) {
        self.router.put(path, handler);
    }

    pub fn delete(&mut self, path: &str, handler: Arc<dyn Handler>) {
        self.router.delete(path, handler);
    }

    /// Bind the listening socket without starting to serve. Separated from
    /// [`HttpServer::run`] so callers can learn the bound address when
    /// binding to port 0.
    pub async fn bind(self) -> std::io::Result<BoundServer> {
        let listener = TcpListener::bind(&self.addr).await?;
        info!(addr = %self.addr, "server listening");
        Ok(BoundServer {
            listener,
            router: Arc::new(self.router),
        })
    }

    /// Bind and serve forever.
    pub async fn run(self) -> std::io::Result<()> {
        self.bind().await?.serve().await
    }
}

/// A server with its socket bound, ready to accept.
pub struct BoundServer {
    listener: TcpListener,
    router: Arc<Router>,
}

impl BoundServer {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever. Accept errors are logged and the loop
    /// continues; each accepted connection runs in its own task.
    pub async fn serve(self) -> std::io::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _peer)) => {
                    let router = self.router.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, router).await;
                    });
                }
                Err(err) => {
                    error!(%err, "error accepting connection");
                }
            }
        }
    }
}

/// One request/response cycle, then the connection closes.
async fn handle_connection(mut stream: TcpStream, router: Arc<Router>) {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    let mut ctx = match HttpRequest::parse(&mut reader).await {
        Ok(mut request) => match router.resolve(&mut request) {
            Resolution::Matched(handler) => {
                let mut ctx = HttpContext::new(request);
                handler.handle(&mut ctx).await;
                ctx
            }
            Resolution::MethodNotAllowed => {
                let mut ctx = HttpContext::new(request);
                respond_json(
                    &mut ctx,
                    405,
                    json!({
                        "error": "invalid method request",
                        "message": status_text(405),
                    }),
                );
                ctx
            }
            Resolution::NotFound => {
                let mut ctx = HttpContext::new(request);
                ctx.text(404, "Not Found");
                ctx
            }
        },
        Err(err) => {
            // Client error; nothing above debug per the error policy.
            debug!(%err, "failed to parse request");
            let mut ctx = HttpContext::new(HttpRequest::default());
            ctx.text(400, "Bad Request");
            ctx
        }
    };

    if let Err(err) = ctx.response.write_to(&mut write_half).await {
        error!(%err, "error writing response");
    }
}
