//! Connection runtime shared by every client in the generated module.
//!
//! One reader task per connection parses inbound frames, asks the client's
//! router for a routing key, and forwards the frame to whoever subscribed to
//! that key. Keys are stream ids when the channel declares one, reply tags
//! when it only declares a dispatcher key, and the empty string otherwise.

use std::fmt::Write as _;

use crate::{AuthScheme, Result};

pub(crate) fn emit_imports(code: &mut String, auth: Option<&AuthScheme>) -> Result<()> {
    writeln!(
        code,
        "use std::collections::HashMap;\n\
         use std::marker::PhantomData;\n\
         use std::sync::atomic::{{AtomicU64, Ordering}};\n\
         use std::sync::{{Arc, Mutex as StdMutex}};\n\
         \n\
         use futures_util::stream::SplitSink;\n\
         use futures_util::{{SinkExt, StreamExt}};\n\
         use serde::de::DeserializeOwned;\n\
         use serde_json::Value;\n\
         use tokio::net::TcpStream;\n\
         use tokio::sync::{{mpsc, Mutex as AsyncMutex}};\n\
         use tokio::task::JoinHandle;\n\
         use tokio_tungstenite::tungstenite::client::IntoClientRequest;\n\
         use tokio_tungstenite::tungstenite::handshake::client::Request;\n\
         use tokio_tungstenite::tungstenite::{{Error as WsError, Message as WsMessage}};\n\
         use tokio_tungstenite::{{connect_async, MaybeTlsStream, WebSocketStream}};"
    )?;
    if let Some(auth) = auth {
        for line in auth.imports() {
            writeln!(code, "{}", line)?;
        }
    }
    Ok(())
}

pub(crate) fn emit_error_enum(code: &mut String) -> Result<()> {
    writeln!(
        code,
        "/// Errors returned by the generated clients.\n\
         #[derive(Debug, thiserror::Error)]\n\
         pub enum ClientError {{\n\
         \x20   /// The connection could not be opened or used\n\
         \x20   #[error(\"connection error: {{0}}\")]\n\
         \x20   Connection(String),\n\
         \x20   /// A message could not be encoded or a reply decoded\n\
         \x20   #[error(\"JSON error: {{0}}\")]\n\
         \x20   Json(#[from] serde_json::Error),\n\
         \x20   /// The connection closed before a reply arrived\n\
         \x20   #[error(\"connection closed before a reply arrived\")]\n\
         \x20   Closed,\n\
         }}\n\
         \n\
         impl From<WsError> for ClientError {{\n\
         \x20   fn from(value: WsError) -> Self {{ ClientError::Connection(value.to_string()) }}\n\
         }}\n"
    )?;
    Ok(())
}

pub(crate) fn emit_response_stream(code: &mut String) -> Result<()> {
    writeln!(
        code,
        "/// A lazily consumed sequence of replies to one streaming request.\n\
         pub struct ResponseStream<T> {{\n\
         \x20   receiver: mpsc::UnboundedReceiver<Value>,\n\
         \x20   marker: PhantomData<T>,\n\
         }}\n\
         \n\
         impl<T: DeserializeOwned> ResponseStream<T> {{\n\
         \x20   fn new(receiver: mpsc::UnboundedReceiver<Value>) -> Self {{ Self {{ receiver, marker: PhantomData }} }}\n\
         \n\
         \x20   /// Wait for the next reply; `None` once the connection is closed.\n\
         \x20   pub async fn next(&mut self) -> Option<Result<T, ClientError>> {{\n\
         \x20       let value = self.receiver.recv().await?;\n\
         \x20       Some(serde_json::from_value(value).map_err(ClientError::from))\n\
         \x20   }}\n\
         }}\n"
    )?;
    Ok(())
}

pub(crate) fn emit_connection(code: &mut String) -> Result<()> {
    writeln!(
        code,
        "type Routes = Arc<StdMutex<HashMap<String, mpsc::UnboundedSender<Value>>>>;\n\
         type Router = fn(Value) -> Option<(String, Value)>;\n\
         type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;\n\
         \n\
         struct Connection {{\n\
         \x20   sink: AsyncMutex<WsSink>,\n\
         \x20   routes: Routes,\n\
         \x20   next_id: AtomicU64,\n\
         \x20   reader: JoinHandle<()>,\n\
         }}\n\
         \n\
         #[allow(dead_code)]\n\
         impl Connection {{\n\
         \x20   async fn open(request: Request, router: Router) -> Result<Self, ClientError> {{\n\
         \x20       let (socket, _) = connect_async(request).await?;\n\
         \x20       let (sink, mut stream) = socket.split();\n\
         \x20       let routes: Routes = Arc::default();\n\
         \x20       let inbound = Arc::clone(&routes);\n\
         \x20       let reader = tokio::spawn(async move {{\n\
         \x20           while let Some(Ok(frame)) = stream.next().await {{\n\
         \x20               let WsMessage::Text(text) = frame else {{ continue }};\n\
         \x20               let Ok(value) = serde_json::from_str::<Value>(&text) else {{ continue }};\n\
         \x20               let Some((key, body)) = router(value) else {{ continue }};\n\
         \x20               let sender = inbound.lock().ok().and_then(|routes| routes.get(&key).cloned());\n\
         \x20               if let Some(sender) = sender {{\n\
         \x20                   let _ = sender.send(body);\n\
         \x20               }}\n\
         \x20           }}\n\
         \x20           // Dropping the senders wakes every waiting caller.\n\
         \x20           if let Ok(mut routes) = inbound.lock() {{\n\
         \x20               routes.clear();\n\
         \x20           }}\n\
         \x20       }});\n\
         \x20       Ok(Self {{ sink: AsyncMutex::new(sink), routes, next_id: AtomicU64::new(1), reader }})\n\
         \x20   }}\n\
         \n\
         \x20   fn subscribe(&self, key: &str) -> mpsc::UnboundedReceiver<Value> {{\n\
         \x20       let (sender, receiver) = mpsc::unbounded_channel();\n\
         \x20       if let Ok(mut routes) = self.routes.lock() {{\n\
         \x20           routes.insert(key.to_string(), sender);\n\
         \x20       }}\n\
         \x20       receiver\n\
         \x20   }}\n\
         \n\
         \x20   fn unsubscribe(&self, key: &str) {{\n\
         \x20       if let Ok(mut routes) = self.routes.lock() {{\n\
         \x20           routes.remove(key);\n\
         \x20       }}\n\
         \x20   }}\n\
         \n\
         \x20   fn next_stream_id(&self) -> String {{ self.next_id.fetch_add(1, Ordering::Relaxed).to_string() }}\n\
         \n\
         \x20   async fn send(&self, message: &Value) -> Result<(), ClientError> {{\n\
         \x20       let text = serde_json::to_string(message)?;\n\
         \x20       self.sink.lock().await.send(WsMessage::Text(text.into())).await?;\n\
         \x20       Ok(())\n\
         \x20   }}\n\
         \n\
         \x20   async fn request<T: DeserializeOwned>(&self, key: &str, message: &Value) -> Result<T, ClientError> {{\n\
         \x20       let mut receiver = self.subscribe(key);\n\
         \x20       let reply = match self.send(message).await {{\n\
         \x20           Ok(()) => receiver.recv().await.ok_or(ClientError::Closed),\n\
         \x20           Err(error) => Err(error),\n\
         \x20       }};\n\
         \x20       self.unsubscribe(key);\n\
         \x20       Ok(serde_json::from_value(reply?)?)\n\
         \x20   }}\n\
         \n\
         \x20   async fn stream<T: DeserializeOwned>(&self, key: &str, message: &Value) -> Result<ResponseStream<T>, ClientError> {{\n\
         \x20       let receiver = self.subscribe(key);\n\
         \x20       if let Err(error) = self.send(message).await {{\n\
         \x20           self.unsubscribe(key);\n\
         \x20           return Err(error);\n\
         \x20       }}\n\
         \x20       Ok(ResponseStream::new(receiver))\n\
         \x20   }}\n\
         \n\
         \x20   async fn close(&self) -> Result<(), ClientError> {{\n\
         \x20       self.sink.lock().await.close().await?;\n\
         \x20       Ok(())\n\
         \x20   }}\n\
         }}\n\
         \n\
         impl Drop for Connection {{\n\
         \x20   fn drop(&mut self) {{ self.reader.abort(); }}\n\
         }}\n"
    )?;
    Ok(())
}

pub(crate) fn emit_header_value(code: &mut String) -> Result<()> {
    writeln!(
        code,
        "fn header_value(value: &str) -> Result<HeaderValue, ClientError> {{\n\
         \x20   HeaderValue::from_str(value).map_err(|e| ClientError::Connection(e.to_string()))\n\
         }}\n"
    )?;
    Ok(())
}
