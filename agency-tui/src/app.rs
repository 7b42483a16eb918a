use std::io;
use std::sync::Arc;
use std::time::Duration;

use agency_core::{
    project, short_address, AgencyConfig, AgencyError, AuthBus, AuthSubscription, ChatRoute,
    ChatView, HttpTransport, JsonRpcWalletProvider, PendingRequest, Platform, SessionHolder,
    WalletConnector, WalletProvider,
};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::events::{Action, InputBuffer, Keybinds};
use crate::platform::{Notice, TuiPlatform};
use crate::theme::{Theme, ThemeManager};
use crate::ui::chat::ChatScroll;
use crate::ui::layout::MainLayout;
use crate::ui::widgets::ToastManager;

pub type SharedHolder = Arc<Mutex<SessionHolder<Arc<HttpTransport>>>>;

const PAGE_ROWS: u16 = 10;

pub struct App {
    pub should_quit: bool,
    pub theme_manager: ThemeManager,
    pub keybinds: Keybinds,
    pub input: InputBuffer,
    pub view: ChatView,
    pub scroll: ChatScroll,
    pub toast_manager: ToastManager,
    pub status_message: Option<String>,
    pub animation_tick: u64,
    pub route: ChatRoute,
    pub user_address: Option<String>,
    pub free_messages_remaining: Option<u32>,
    pub can_send: bool,
    pub base_url: String,
    tick_rate: Duration,
    greet_on_start: bool,
    holder: SharedHolder,
    transport: Arc<HttpTransport>,
    connector: Arc<WalletConnector>,
    auth: AuthSubscription,
    notices: UnboundedReceiver<Notice>,
}

impl App {
    pub fn new(config: &AgencyConfig, route: ChatRoute) -> Result<Self> {
        let transport = Arc::new(HttpTransport::from_config(&config.server)?);

        let bus = AuthBus::new();
        let auth = bus.subscribe();
        let (platform, notices) = TuiPlatform::new(&config.wallet.user_agent);
        let provider = match &config.wallet.rpc_url {
            Some(url) => {
                let provider: Arc<dyn WalletProvider> = Arc::new(JsonRpcWalletProvider::new(url)?);
                Some(provider)
            }
            None => None,
        };
        let platform: Arc<dyn Platform> = Arc::new(platform);
        let connector = Arc::new(WalletConnector::new(
            provider,
            platform,
            bus,
            config.wallet.clone(),
        ));

        let holder = SessionHolder::new(transport.clone())
            .with_route(route.clone())
            .with_policy(config.chat.gating_policy())
            .with_default_agent(config.chat.default_agent.clone());
        let view = project(holder.state());
        let can_send = holder.can_send();

        let theme_manager = ThemeManager::with_theme(&config.tui.theme);

        Ok(Self {
            should_quit: false,
            status_message: Some(format!(
                "Connected to {}. Theme: {}.",
                config.server.base_url,
                theme_manager.current_theme_name()
            )),
            theme_manager,
            keybinds: Keybinds::new(),
            input: InputBuffer::new(),
            view,
            scroll: ChatScroll::default(),
            toast_manager: ToastManager::new(),
            animation_tick: 0,
            route,
            user_address: None,
            free_messages_remaining: None,
            can_send,
            base_url: config.server.base_url.clone(),
            tick_rate: Duration::from_millis(config.tui.tick_rate_ms),
            greet_on_start: config.chat.greet_on_start,
            holder: Arc::new(Mutex::new(holder)),
            transport,
            connector,
            auth,
            notices,
        })
    }

    /// Restore an existing wallet session and fetch the greeting (or the
    /// stored history on a conversation route).
    pub async fn start(&mut self) -> Option<JoinHandle<()>> {
        if let Some(address) = self.connector.check_connection().await {
            self.holder.lock().await.restore_authentication(&address);
        }

        let handle = if self.greet_on_start || matches!(self.route, ChatRoute::Conversation(_)) {
            Some(self.spawn_greeting())
        } else {
            None
        };
        self.sync();
        handle
    }

    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        self.start().await;

        loop {
            self.animation_tick = self.animation_tick.wrapping_add(1);
            self.toast_manager.cleanup();
            self.sync();

            terminal.draw(|frame| {
                MainLayout::render(frame, self);
            })?;

            if event::poll(self.tick_rate)? {
                let evt = event::read()?;
                self.handle_event(evt);
            }

            if self.should_quit {
                break;
            }
        }

        self.holder.lock().await.unmount();
        Ok(())
    }

    /// Pull wallet notices and auth events in, and refresh the view snapshot.
    /// Never blocks: a busy holder is picked up on the next tick.
    pub fn sync(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            match notice {
                Notice::Alert(message) => self.toast_manager.warning(message),
                Notice::OpenApp(url) => self
                    .toast_manager
                    .info(format!("Open the MetaMask app: {}", url)),
                Notice::Install(url) => self
                    .toast_manager
                    .info(format!("Install MetaMask to continue: {}", url)),
            }
        }

        let Ok(mut holder) = self.holder.try_lock() else {
            return;
        };

        if holder.apply_auth_events(&mut self.auth) > 0 {
            if let Some(address) = &holder.state().user_address {
                self.toast_manager
                    .success(format!("Wallet connected: {}", short_address(address)));
            }
        }

        let state = holder.state();
        if state.revision != self.view.revision {
            self.view = project(state);
        }
        self.user_address = state.user_address.clone();
        self.free_messages_remaining = state.free_messages_remaining;
        self.can_send = holder.can_send();
        drop(holder);

        self.scroll.follow(self.view.revision);
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key_event(key.code, key.modifiers);
            }
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if let Some(action) = self.keybinds.get(key, modifiers) {
            self.execute_action(action);
            return;
        }

        match key {
            KeyCode::Char(c)
                if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.input.insert(c);
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.home(),
            KeyCode::End => self.input.end(),
            _ => {}
        }
    }

    fn execute_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Submit => {
                self.submit();
            }
            Action::ConnectWallet => {
                self.connect_wallet();
            }
            Action::ClearChat => self.clear_chat(),
            Action::ToggleTheme => {
                self.theme_manager.cycle_theme();
                self.status_message = Some(format!(
                    "Theme changed to: {}",
                    self.theme_manager.current_theme_name()
                ));
            }
            Action::ScrollUp => self.scroll.up(1),
            Action::ScrollDown => self.scroll.down(1),
            Action::PageUp => self.scroll.up(PAGE_ROWS),
            Action::PageDown => self.scroll.down(PAGE_ROWS),
            Action::ScrollToEnd => self.scroll.to_end(),
            Action::DismissToasts => self.toast_manager.clear(),
        }
    }

    /// Send the input line. The text stays in the editor when sending is not
    /// possible right now.
    pub fn submit(&mut self) -> Option<JoinHandle<()>> {
        if self.input.is_blank() {
            return None;
        }
        if self.view.typing {
            self.status_message = Some("Waiting for the current reply...".to_string());
            return None;
        }
        if !self.can_send {
            let text = self
                .view
                .banner
                .map(|b| b.text())
                .unwrap_or_else(|| "Sending is not available right now.".to_string());
            self.toast_manager.warning(text);
            return None;
        }

        // The line leaves the editor only once the holder has accepted it.
        let begun = match self.holder.try_lock() {
            Ok(mut holder) => holder.begin_send(self.input.text()),
            Err(_) => {
                self.status_message = Some("Busy, try again in a moment".to_string());
                return None;
            }
        };
        match begun {
            Ok(request) => {
                self.input.take();
                self.status_message = None;
                Some(self.spawn_request(request))
            }
            Err(AgencyError::RequestInFlight) => {
                self.status_message = Some("Waiting for the current reply...".to_string());
                None
            }
            Err(e) => {
                debug!(error_code = e.error_code(), "Send refused: {}", e);
                self.toast_manager.warning(e.detail());
                None
            }
        }
    }

    pub fn connect_wallet(&mut self) -> JoinHandle<()> {
        self.status_message = Some("Connecting wallet...".to_string());
        let connector = self.connector.clone();
        tokio::spawn(async move {
            let outcome = connector.connect().await;
            debug!(?outcome, "Wallet connect finished");
        })
    }

    fn clear_chat(&mut self) {
        match self.holder.try_lock() {
            Ok(mut holder) => {
                holder.clear();
                self.status_message = Some("Conversation cleared".to_string());
            }
            Err(_) => {
                self.status_message = Some("Busy, try again in a moment".to_string());
            }
        }
    }

    fn spawn_greeting(&self) -> JoinHandle<()> {
        let holder = self.holder.clone();
        let transport = self.transport.clone();
        tokio::spawn(async move {
            let begun = holder.lock().await.begin_greeting();
            let request = match begun {
                Ok(request) => request,
                Err(e) => {
                    debug!(error = %e, "Greeting not issued");
                    return;
                }
            };
            let result = request.execute(transport.as_ref()).await;
            holder.lock().await.complete(request, result);
        })
    }

    fn spawn_request(&self, request: PendingRequest) -> JoinHandle<()> {
        let holder = self.holder.clone();
        let transport = self.transport.clone();
        tokio::spawn(async move {
            let result = request.execute(transport.as_ref()).await;
            holder.lock().await.complete(request, result);
        })
    }

    pub fn current_theme(&self) -> &dyn Theme {
        self.theme_manager.current_theme()
    }

    pub fn animation_frame(&self) -> u64 {
        self.animation_tick
    }
}
