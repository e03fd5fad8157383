//! Client loop: one WebSocket, one engine, one terminal.

use crate::config::ClientConfig;
use crate::tui::{
    self, KeyOutcome, Tui,
    command::{Command, parse_command},
    surface::TerminalSurface,
};
use anyhow::Result;
use bughouse_core::{ClientMessage, Effect, Intent, SyncEngine, TransportEvent};
use crossterm::event::KeyEvent;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_websockets::{ClientBuilder, Message, WebSocketStream};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Engine plus the surface its render instructions land on.
#[derive(Debug)]
pub struct ClientApp {
    engine: SyncEngine,
    surface: TerminalSurface,
}

impl ClientApp {
    /// A disconnected client.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            engine: SyncEngine::new(*config.bank_authority()),
            surface: TerminalSurface::new(),
        }
    }

    /// The synchronization engine.
    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// The view model.
    pub fn surface(&self) -> &TerminalSurface {
        &self.surface
    }

    /// Applies render effects to the surface and returns the messages to send.
    pub fn apply(&mut self, effects: Vec<Effect>) -> Vec<ClientMessage> {
        let mut outbound = Vec::new();
        for effect in effects {
            match effect {
                Effect::Render(instruction) => self.surface.apply(instruction),
                Effect::Send(message) => outbound.push(message),
            }
        }
        outbound
    }

    /// Feeds a transport change to the engine.
    pub fn transport(&mut self, event: TransportEvent) -> Vec<ClientMessage> {
        let effects = self.engine.handle_transport(event);
        self.apply(effects)
    }

    /// Feeds one inbound text frame to the engine. Malformed frames are dropped.
    pub fn frame(&mut self, text: &str) -> Vec<ClientMessage> {
        match self.engine.handle_frame(text) {
            Ok(effects) => self.apply(effects),
            Err(_) => Vec::new(),
        }
    }

    /// Hands an intent to the engine. Rejected intents are no-ops.
    pub fn intent(&mut self, intent: Intent) -> Vec<ClientMessage> {
        match self.engine.handle_intent(intent) {
            Ok(effects) => self.apply(effects),
            Err(_) => Vec::new(),
        }
    }

    /// Parses a submitted line. Returns `None` when the user asked to quit.
    pub fn submit(&mut self, line: &str) -> Option<Vec<ClientMessage>> {
        match parse_command(line, self.engine.session().role()) {
            Ok(None) => Some(Vec::new()),
            Ok(Some(Command::Quit)) => None,
            Ok(Some(Command::Intent(intent))) => Some(self.intent(intent)),
            Err(e) => {
                debug!(error = %e, "Command not parsed");
                self.surface.notice(e.to_string());
                Some(Vec::new())
            }
        }
    }

    fn key(&mut self, key: KeyEvent) -> (Flow, Vec<ClientMessage>) {
        match tui::handle_key(&mut self.surface, key) {
            KeyOutcome::Quit => (Flow::Quit, Vec::new()),
            KeyOutcome::Submit(line) => match self.submit(&line) {
                Some(outbound) => (Flow::Continue, outbound),
                None => (Flow::Quit, Vec::new()),
            },
            KeyOutcome::Edited | KeyOutcome::Ignored => (Flow::Continue, Vec::new()),
        }
    }

    fn redraw(&self, terminal: &mut Tui) -> Result<()> {
        terminal.draw(|frame| tui::ui::draw(frame, &self.surface))?;
        Ok(())
    }
}

/// Runs the terminal client until the user quits.
pub async fn run_client(config: ClientConfig) -> Result<()> {
    init_file_logging(&config)?;
    info!(server_url = %config.server_url(), "Starting bughouse client");

    let mut terminal = tui::setup_terminal()?;
    let res = run_session(&mut terminal, &config).await;
    tui::restore_terminal(&mut terminal)?;

    if let Err(err) = &res {
        error!(error = ?err, "Client loop error");
    }
    res
}

#[instrument(skip_all, fields(server_url = %config.server_url()))]
async fn run_session(terminal: &mut Tui, config: &ClientConfig) -> Result<()> {
    let mut app = ClientApp::new(config);
    let mut keys = tui::spawn_key_reader();
    app.redraw(terminal)?;

    match connect(config.server_url()).await {
        Ok(ws) => {
            if pump(terminal, &mut app, ws, &mut keys, config.room().as_deref()).await? == Flow::Quit {
                return Ok(());
            }
        }
        Err(e) => {
            warn!(error = %e, "Connection failed");
            app.surface
                .notice(format!("Could not connect to {}: {}", config.server_url(), e));
        }
    }

    // Disconnected: keep the last screen until the user leaves.
    app.redraw(terminal)?;
    while let Some(key) = keys.recv().await {
        let (flow, _) = app.key(key);
        if flow == Flow::Quit {
            break;
        }
        app.redraw(terminal)?;
    }
    Ok(())
}

async fn connect(
    url: &str,
) -> Result<WebSocketStream<tokio_websockets::MaybeTlsStream<tokio::net::TcpStream>>> {
    info!(url, "Connecting");
    let (ws, _response) = ClientBuilder::new().uri(url)?.connect().await?;
    info!("Connected");
    Ok(ws)
}

/// Drives one connection until it closes or the user quits.
async fn pump<S>(
    terminal: &mut Tui,
    app: &mut ClientApp,
    mut ws: WebSocketStream<S>,
    keys: &mut mpsc::UnboundedReceiver<KeyEvent>,
    auto_join: Option<&str>,
) -> Result<Flow>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut outbound = app.transport(TransportEvent::Opened);
    if let Some(room) = auto_join {
        info!(room, "Auto-joining");
        outbound.extend(app.intent(Intent::Join {
            room: room.to_string(),
        }));
    }

    loop {
        let mut open = send_all(&mut ws, outbound).await;
        app.redraw(terminal)?;
        if !open {
            break;
        }

        tokio::select! {
            frame = ws.next() => match frame {
                Some(Ok(msg)) => {
                    if let Some(text) = msg.as_text() {
                        outbound = app.frame(text);
                    } else {
                        if msg.is_close() {
                            debug!("Close frame received");
                            open = false;
                        }
                        outbound = Vec::new();
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket error");
                    open = false;
                    outbound = Vec::new();
                }
                None => {
                    debug!("WebSocket stream ended");
                    open = false;
                    outbound = Vec::new();
                }
            },
            key = keys.recv() => match key {
                Some(key) => {
                    let (flow, messages) = app.key(key);
                    if flow == Flow::Quit {
                        info!("Quit requested");
                        let _ = ws.close().await;
                        return Ok(Flow::Quit);
                    }
                    outbound = messages;
                }
                None => return Ok(Flow::Quit),
            },
        }

        if !open {
            break;
        }
    }

    info!("Connection closed");
    app.transport(TransportEvent::Closed);
    Ok(Flow::Continue)
}

/// Sends every message; returns false once the socket refuses a write.
async fn send_all<S>(ws: &mut WebSocketStream<S>, outbound: Vec<ClientMessage>) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    for message in outbound {
        let text = match message.encode() {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Failed to encode outbound message");
                continue;
            }
        };
        debug!(%text, "Sending");
        if let Err(e) = ws.send(Message::text(text)).await {
            warn!(error = %e, "Send failed");
            return false;
        }
    }
    true
}

fn init_file_logging(config: &ClientConfig) -> Result<()> {
    let log_file = std::fs::File::create(config.log_file())?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
