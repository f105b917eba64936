//! UI helper components

use alloy::primitives::Address;
use eframe::egui;

use privacy_checkin_core::StatusPhase;

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(0, 212, 170);
pub const SUCCESS: egui::Color32 = egui::Color32::from_rgb(80, 200, 120);
pub const ERROR: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);
pub const PENDING: egui::Color32 = egui::Color32::from_rgb(220, 180, 50);
pub const MUTED: egui::Color32 = egui::Color32::from_rgb(140, 140, 150);

/// Placeholder shown wherever a coordinate is still encrypted.
pub const REDACTED_COORDINATE: &str = "●●●.●●●●●";

/// Block explorer URL for an address on the configured chain
pub fn explorer_address_url(chain_name: &str, address: &Address) -> String {
    let base = match chain_name.to_lowercase().as_str() {
        "ethereum" | "mainnet" => "https://etherscan.io",
        "sepolia" => "https://sepolia.etherscan.io",
        "holesky" => "https://holesky.etherscan.io",
        "base" => "https://basescan.org",
        "base-sepolia" => "https://sepolia.basescan.org",
        "optimism" => "https://optimistic.etherscan.io",
        "arbitrum" => "https://arbiscan.io",
        "polygon" => "https://polygonscan.com",
        _ => "https://sepolia.etherscan.io",
    };
    format!("{base}/address/{address}")
}

pub fn open_url_new_tab(url: &str) {
    if let Err(e) = open::that(url) {
        tracing::warn!(url, error = %e, "failed to open browser");
    }
}

pub fn copy_to_clipboard(text: &str) {
    if let Ok(mut clipboard) = arboard::Clipboard::new() {
        let _ = clipboard.set_text(text);
    }
}

/// `0x123456...abcd`
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    if full.len() <= 14 {
        return full;
    }
    format!("{}...{}", &full[..8], &full[full.len() - 4..])
}

/// Unix seconds rendered in local time.
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "unknown time".to_owned())
}

pub fn format_degrees(degrees: f64) -> String {
    format!("{degrees:.6}°")
}

/// Styled heading with accent color
pub fn styled_heading(ui: &mut egui::Ui, text: &str) {
    ui.heading(egui::RichText::new(text).color(ACCENT));
}

/// Section header with separator
pub fn section_header(ui: &mut egui::Ui, text: &str) {
    ui.add_space(10.0);
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(text).strong().size(14.0));
    });
    ui.separator();
}

/// Primary action button - teal/accent colored, prominent
pub fn primary_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    let accent = egui::Color32::from_rgb(0, 180, 150);
    let btn = egui::Button::new(egui::RichText::new(text).size(14.0).color(egui::Color32::WHITE))
        .min_size(egui::vec2(130.0, 34.0))
        .fill(accent);
    ui.add_enabled(enabled, btn)
}

pub fn secondary_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    let btn =
        egui::Button::new(egui::RichText::new(text).size(13.0)).min_size(egui::vec2(90.0, 30.0));
    ui.add_enabled(enabled, btn)
}

pub fn stat_card(ui: &mut egui::Ui, icon: &str, value: usize, label: &str) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_min_width(160.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(icon).size(24.0));
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(value.to_string()).size(22.0).strong());
                    ui.label(egui::RichText::new(label).color(MUTED));
                });
            });
        });
}

pub fn phase_color(phase: StatusPhase) -> egui::Color32 {
    match phase {
        StatusPhase::Success => SUCCESS,
        StatusPhase::Error => ERROR,
        StatusPhase::Pending | StatusPhase::Idle => PENDING,
    }
}

pub fn phase_icon(phase: StatusPhase) -> &'static str {
    match phase {
        StatusPhase::Success => "✅",
        StatusPhase::Error => "❌",
        StatusPhase::Pending | StatusPhase::Idle => "⏳",
    }
}

/// Label and value on one row
pub fn labeled_value(ui: &mut egui::Ui, label: &str, value: impl Into<egui::WidgetText>) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(format!("{label}:")).strong());
        ui.label(value);
    });
}

pub fn loading_screen(ui: &mut egui::Ui, title: &str, note: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() / 3.0);
        ui.spinner();
        ui.add_space(10.0);
        ui.label(egui::RichText::new(title).size(16.0));
        ui.label(egui::RichText::new(note).color(MUTED));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_keeps_prefix_and_suffix() {
        let address: Address = "0x1234567890abcdef1234567890abcdef1234abcd"
            .parse()
            .expect("address");
        let short = short_address(&address);
        assert!(short.starts_with("0x123456"));
        assert!(short.to_lowercase().ends_with("abcd"));
        assert_eq!(short.len(), 8 + 3 + 4);
    }

    #[test]
    fn explorer_url_follows_chain_name() {
        let address = Address::repeat_byte(0x11);
        assert!(explorer_address_url("Sepolia", &address)
            .starts_with("https://sepolia.etherscan.io/address/0x"));
        assert!(explorer_address_url("mainnet", &address).starts_with("https://etherscan.io/"));
    }

    #[test]
    fn timestamps_outside_range_are_labelled() {
        assert_eq!(format_timestamp(u64::MAX), "unknown time");
        assert!(!format_timestamp(1_739_750_400).is_empty());
    }
}
