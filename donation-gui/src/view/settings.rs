//! Settings screen.

use egui::Ui;

use crate::config::Config;
use crate::state::AppState;

/// Render the settings screen.
pub fn show(ui: &mut Ui, state: &AppState, config: &Config) {
    ui.heading("Settings");
    ui.separator();
    ui.add_space(10.0);

    // Wallet provider
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("Wallet").strong());
        ui.add_space(4.0);
        ui.label(format!("Provider: {}", config.provider_url));
        match state.account {
            Some(account) => {
                ui.label(format!("Account: {}", account));
                if state.is_owner() {
                    ui.label(
                        egui::RichText::new("Contract owner ✅").color(egui::Color32::GREEN),
                    );
                }
            }
            None => {
                ui.label("Account: not connected");
            }
        }
    });

    ui.add_space(10.0);

    // Contract
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("Contract").strong());
        ui.add_space(4.0);
        match state.contract_address {
            Some(address) => ui.label(format!("Address: {}", address)),
            None => ui.colored_label(egui::Color32::RED, "Address: not configured"),
        };
        if let Some(owner) = state.owner {
            ui.label(format!("Owner: {}", owner));
        }
        ui.label(format!(
            "Confirmation timeout: {}s (polling every {} ms)",
            config.confirmation_timeout_secs, config.receipt_poll_ms
        ));
    });

    ui.add_space(10.0);

    // Price feed
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("Price feed").strong());
        ui.add_space(4.0);
        ui.label(format!("Source: {}", config.price_feed_url));
        ui.label(format!(
            "Pair: {} / {}",
            config.coin_id,
            config.fiat_currency.to_uppercase()
        ));
        match state.rate {
            Some(ref rate) => ui.label(format!("Current rate: {:.2}", rate.price)),
            None => ui.label("Current rate: unavailable"),
        };
    });

    ui.add_space(10.0);

    if let Ok(path) = Config::config_path() {
        ui.label(
            egui::RichText::new(format!("Edit {} and restart to change these values.", path.display()))
                .color(egui::Color32::GRAY)
                .small(),
        );
    }
}
