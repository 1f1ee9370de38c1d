//! Local HTTP server answering like the Gemini `generateContent` endpoint.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use serde_json::json;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// Status code and JSON body sent back for one request.
pub type Reply = (u16, String);

type Route = dyn Fn(&str) -> Reply + Send + Sync;

/// A request as received by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub body: String,
}

/// Serves `route(path)` for every request on an ephemeral local port.
pub struct StubGemini {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubGemini {
    pub async fn start<F>(route: F) -> Self
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Failed to read stub address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let route: Arc<Route> = Arc::new(route);
        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let route = route.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, route.as_ref(), &log).await;
                });
            }
        });

        Self { addr, requests }
    }

    /// Value for `GeminiConfig::base_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(
    mut stream: TcpStream,
    route: &Route,
    log: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = header_value(&head, "content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    log.lock().unwrap().push(RecordedRequest {
        path: path.clone(),
        api_key: header_value(&head, "x-goog-api-key"),
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    });

    let (status, body) = route(&path);
    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn header_value(head: &str, name: &str) -> Option<String> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

/// Envelope carrying `text` as the first candidate's only part.
pub fn text_reply(text: &str) -> String {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
}

/// Envelope carrying one inline image part.
pub fn image_reply(mime_type: &str, data: &str) -> String {
    json!({
        "candidates": [{ "content": { "parts": [
            { "inlineData": { "mimeType": mime_type, "data": data } }
        ] } }]
    })
    .to_string()
}

/// Two tofu recipes in the response-schema shape.
pub const TOFU_RECIPES: &str = r#"[
  {"name":"Crispy Tofu","description":"Golden cubes","prepTime":"10 minutes",
   "cookTime":"20 minutes","ingredients":["1 block tofu","cornstarch"],
   "instructions":["Press the tofu","Fry until golden"],"imagePrompt":"crispy tofu"},
  {"name":"Tofu Soup","description":"Light broth","prepTime":"1 hour",
   "cookTime":"15 minutes","ingredients":["tofu","miso"],
   "instructions":["Heat broth","Add tofu"],"imagePrompt":"tofu soup"}
]"#;

/// Recipes for the text model, PNG images for the image model.
pub fn tofu_route(path: &str) -> Reply {
    if path.contains("-image:") {
        (200, image_reply("image/png", "AAAA"))
    } else {
        (200, text_reply(TOFU_RECIPES))
    }
}
