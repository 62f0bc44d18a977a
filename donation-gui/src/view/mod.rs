//! UI view modules — pure rendering functions.
//!
//! Each submodule renders one screen. Views read from [`AppState`] and send
//! [`UiEvent`]s on user interaction. No async, no network, no contract logic.
//!
//! [`AppState`]: crate::state::AppState
//! [`UiEvent`]: crate::events::UiEvent

pub mod campaigns;
pub mod donate;
pub mod history;
pub mod leaderboard;
pub mod settings;

use donation::{format_ether, Campaign, U256};
use egui::Ui;
use tokio::sync::mpsc;

use crate::events::UiEvent;
use crate::state::AppState;

/// "raised / target ETH"; a `U256::MAX` target means the campaign has no cap.
pub fn progress_text(campaign: &Campaign) -> String {
    if campaign.target == U256::MAX {
        format!("{} ETH raised (no target)", format_ether(campaign.total_donated))
    } else {
        format!(
            "{} / {} ETH",
            format_ether(campaign.total_donated),
            format_ether(campaign.target)
        )
    }
}

/// Error, success and read-failure notices shared by every screen.
pub fn status_messages(ui: &mut Ui, state: &AppState) {
    if let Some(ref err) = state.error {
        ui.add_space(10.0);
        ui.colored_label(egui::Color32::RED, format!("Error: {}", err));
    }
    if let Some(ref msg) = state.success {
        ui.add_space(10.0);
        ui.colored_label(egui::Color32::GREEN, msg);
        if let Some(ref hash) = state.last_tx_hash {
            ui.label(
                egui::RichText::new(hash)
                    .monospace()
                    .color(egui::Color32::GRAY)
                    .small(),
            );
        }
    }
    if let Some(ref notice) = state.notice {
        ui.add_space(10.0);
        ui.colored_label(egui::Color32::YELLOW, notice);
    }
}

/// Campaign filter shared by the donate, history and leaderboard screens.
///
/// `all_label` names the `None` entry; pass `None` to hide it.
pub fn campaign_selector(
    ui: &mut Ui,
    id: &str,
    state: &mut AppState,
    all_label: Option<&str>,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) {
    if state.campaigns.is_empty() {
        return;
    }

    let current = match state.selected() {
        Some(c) => c.name.clone(),
        None => all_label.unwrap_or("Select a campaign").to_string(),
    };
    let mut choice = state.selected_campaign;

    egui::ComboBox::from_id_salt(id)
        .selected_text(current)
        .width(260.0)
        .show_ui(ui, |ui| {
            if let Some(label) = all_label {
                ui.selectable_value(&mut choice, None, label);
            }
            for campaign in &state.campaigns {
                let label = if campaign.active {
                    campaign.name.clone()
                } else {
                    format!("{} (closed)", campaign.name)
                };
                ui.selectable_value(&mut choice, Some(campaign.id), label);
            }
        });

    if state.select_campaign(choice) {
        let _ = ui_tx.send(UiEvent::SelectCampaign(choice));
    }
}
