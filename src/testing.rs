//! In-process HTTP backend for exercising the network clients

use std::{sync::mpsc::Sender, thread::JoinHandle};

use rouille::{Request, Response, Server};

pub struct TestServer {
    pub url: String,
    handle: Option<JoinHandle<()>>,
    stop: Sender<()>,
}

impl TestServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        let server = Server::new("127.0.0.1:0", handler).expect("test server should bind");
        let url = format!("http://{}", server.server_addr());
        let (handle, stop) = server.stoppable();
        Self {
            url,
            handle: Some(handle),
            stop,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
