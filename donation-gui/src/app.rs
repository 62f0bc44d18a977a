//! Application struct — the eframe::App implementation.
//!
//! Thin wrapper: drains service events, dispatches to view modules.
//! No async, no network, no contract logic.

use donation::AddressExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::{Screen, ServiceEvent, UiEvent};
use crate::qr::QrMatrix;
use crate::state::AppState;
use crate::view;

/// The donation client application.
pub struct App {
    pub state: AppState,
    pub ui_tx: mpsc::UnboundedSender<UiEvent>,
    svc_rx: mpsc::UnboundedReceiver<ServiceEvent>,
    shutdown_token: CancellationToken,
    config: Config,
    contract_qr: Option<QrMatrix>,
}

impl App {
    /// Create a new App, spawning the background service task.
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (svc_tx, svc_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        // Spawn the single background service task
        let svc_token = token.clone();
        tokio::spawn(crate::service::run(svc_token, ui_rx, svc_tx, config.clone()));

        let contract_address = config.contract().ok();
        let contract_qr = contract_address.and_then(|address| {
            QrMatrix::encode(&address.to_string())
                .map_err(|e| log::warn!("QR encoding failed: {:?}", e))
                .ok()
        });

        let state = AppState {
            contract_address,
            fiat_currency: config.fiat_currency.clone(),
            ..AppState::default()
        };

        Self {
            state,
            ui_tx,
            svc_rx,
            shutdown_token: token,
            config,
            contract_qr,
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.ui_tx.send(UiEvent::Shutdown);
        self.shutdown_token.cancel();
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Ensure we repaint regularly to pick up background service events
        ctx.request_repaint_after(std::time::Duration::from_secs(1));

        // 1. Drain all pending service events (non-blocking)
        while let Ok(event) = self.svc_rx.try_recv() {
            self.state.apply(event);
            ctx.request_repaint();
        }

        // 2. Top bar — wallet connection and refresh
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match self.state.account {
                    Some(account) => {
                        ui.label(egui::RichText::new(format!("👛 {}", account.short())).monospace())
                            .on_hover_text(account.to_string());
                    }
                    None => {
                        if ui.button("Connect Wallet").clicked() {
                            let _ = self.ui_tx.send(UiEvent::ConnectWallet);
                        }
                    }
                }

                if let Some(kind) = self.state.pending_write {
                    ui.spinner();
                    ui.label(format!("{} pending…", kind.label()));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(!self.state.loading, egui::Button::new("⟳ Refresh"))
                        .clicked()
                    {
                        self.state.notice = None;
                        let _ = self.ui_tx.send(UiEvent::Refresh);
                    }
                });
            });
        });

        // 3. Navigation sidebar
        egui::SidePanel::left("nav").show(ctx, |ui| {
            ui.add_space(10.0);
            ui.label(egui::RichText::new("Donation Desk").strong());
            ui.separator();
            ui.add_space(5.0);

            nav_button(ui, &mut self.state, "💝 Donate", Screen::Donate, &self.ui_tx);
            nav_button(ui, &mut self.state, "📋 History", Screen::History, &self.ui_tx);
            nav_button(
                ui,
                &mut self.state,
                "🏆 Leaderboard",
                Screen::Leaderboard,
                &self.ui_tx,
            );
            nav_button(
                ui,
                &mut self.state,
                "🎯 Campaigns",
                Screen::Campaigns,
                &self.ui_tx,
            );
            ui.separator();
            nav_button(
                ui,
                &mut self.state,
                "⚙ Settings",
                Screen::Settings,
                &self.ui_tx,
            );
        });

        // 4. Central panel — route to the active view
        egui::CentralPanel::default().show(ctx, |ui| match self.state.screen {
            Screen::Donate => {
                view::donate::show(ui, &mut self.state, self.contract_qr.as_ref(), &self.ui_tx);
            }
            Screen::History => {
                view::history::show(ui, &mut self.state, &self.ui_tx);
            }
            Screen::Leaderboard => {
                view::leaderboard::show(ui, &mut self.state, &self.ui_tx);
            }
            Screen::Campaigns => {
                view::campaigns::show(ui, &mut self.state, &self.ui_tx);
            }
            Screen::Settings => {
                view::settings::show(ui, &self.state, &self.config);
            }
        });
    }
}

/// Render a navigation button, highlighting the active screen.
fn nav_button(
    ui: &mut egui::Ui,
    state: &mut AppState,
    label: &str,
    screen: Screen,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) {
    let is_active = state.screen == screen;
    let button = egui::Button::new(egui::RichText::new(label).size(14.0))
        .selected(is_active)
        .min_size(egui::vec2(140.0, 28.0));

    if ui.add(button).clicked() && !is_active {
        state.screen = screen;
        let _ = ui_tx.send(UiEvent::NavigatedTo(screen));
    }
}
