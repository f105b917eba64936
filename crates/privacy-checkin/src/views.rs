//! Screens and panels of the dashboard. Views only read the dashboard and
//! edit its form fields; anything that needs a port call is returned as an
//! [`Action`] for the app to dispatch.

use eframe::egui;

use privacy_checkin_core::{
    CheckInRecord, Dashboard, LatitudeView, RecordId, StatusPhase, StatusToast, USER_HISTORY_LIMIT,
};

use crate::ui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Connect,
    Refresh,
    TestAvailability,
    OpenCreate,
    CloseCreate,
    SubmitCreate,
    Select(RecordId),
    CloseDetail,
    Decrypt(RecordId),
}

const FHE_NOTES: [(&str, &str); 3] = [
    (
        "Location encryption",
        "Latitude is encrypted with FHE before it is stored on-chain.",
    ),
    (
        "Verifiable decryption",
        "Decryption is proven on-chain without trusting the client.",
    ),
    (
        "No movement trail",
        "Check-ins never reveal a traceable path of coordinates.",
    ),
];

pub fn intro(ui: &mut egui::Ui, connecting: bool, actions: &mut Vec<Action>) {
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.label(egui::RichText::new("🔐").size(48.0));
        ui::styled_heading(ui, "Private Location Check-In");
        ui.label("Prove you were somewhere without publishing where.");
        ui.add_space(20.0);

        ui.horizontal(|ui| {
            for (title, body) in FHE_NOTES {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(220.0);
                    ui.label(egui::RichText::new(title).strong());
                    ui.label(egui::RichText::new(body).color(ui::MUTED));
                });
            }
        });

        ui.add_space(30.0);
        let label = if connecting { "Connecting..." } else { "Connect wallet" };
        if ui::primary_button(ui, label, !connecting).clicked() {
            actions.push(Action::Connect);
        }
    });
}

pub fn header(
    ui: &mut egui::Ui,
    dashboard: &Dashboard,
    chain_name: &str,
    actions: &mut Vec<Action>,
) {
    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.heading(
            egui::RichText::new("📍 Privacy Check-In FHE")
                .size(22.0)
                .color(ui::ACCENT),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            match dashboard.account {
                Some(account) => {
                    let who = format!("{} · {}", ui::short_address(&account), chain_name);
                    ui.label(egui::RichText::new(who).monospace());
                }
                None => {
                    if ui::secondary_button(ui, "Connect", true).clicked() {
                        actions.push(Action::Connect);
                    }
                }
            }
            ui.separator();
            if ui::primary_button(ui, "+ New check-in", dashboard.can_open_create()).clicked() {
                actions.push(Action::OpenCreate);
            }
            if ui::secondary_button(ui, "Test system", dashboard.is_connected()).clicked() {
                actions.push(Action::TestAvailability);
            }
        });
    });
    ui.add_space(4.0);
}

pub fn stats(ui: &mut egui::Ui, dashboard: &Dashboard) {
    let stats = dashboard.stats();
    ui.horizontal(|ui| {
        ui::stat_card(ui, "📊", stats.total, "Total check-ins");
        ui::stat_card(ui, "✅", stats.verified, "Verified");
        ui::stat_card(ui, "👤", stats.user_total, "My check-ins");
    });
}

pub fn controls(ui: &mut egui::Ui, dashboard: &mut Dashboard, actions: &mut Vec<Action>) {
    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut dashboard.filter.search)
                .hint_text("Search check-in locations...")
                .desired_width(280.0),
        );
        ui.checkbox(&mut dashboard.filter.verified_only, "Verified only");
        let refreshing = dashboard.is_refreshing();
        let label = if refreshing { "Refreshing..." } else { "🔄 Refresh" };
        if ui::secondary_button(ui, label, !refreshing).clicked() {
            actions.push(Action::Refresh);
        }
    });
}

pub fn record_list(ui: &mut egui::Ui, dashboard: &Dashboard, actions: &mut Vec<Action>) {
    ui::section_header(ui, "Private check-ins");
    let rows = dashboard.visible_records();
    if rows.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(30.0);
            ui.label(egui::RichText::new("📍").size(32.0));
            ui.label(egui::RichText::new("No check-ins yet").color(ui::MUTED));
        });
        return;
    }
    for record in rows {
        record_row(ui, record, actions);
        ui.add_space(4.0);
    }
}

fn record_row(ui: &mut egui::Ui, record: &CheckInRecord, actions: &mut Vec<Action>) {
    let response = egui::Frame::group(ui.style())
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&record.name).strong().size(15.0));
                if record.is_verified {
                    ui.label(egui::RichText::new("✅ Verified").color(ui::SUCCESS));
                } else {
                    ui.label(egui::RichText::new("🔒 Encrypted").color(ui::PENDING));
                }
            });
            ui.label(
                egui::RichText::new(format!(
                    "Coordinates: {0}, {0}",
                    ui::REDACTED_COORDINATE
                ))
                .monospace()
                .color(ui::MUTED),
            );
            ui.horizontal(|ui| {
                ui.label(format!("👤 {}", ui::short_address(&record.creator)));
                ui.label(format!("🕒 {}", ui::format_timestamp(record.timestamp)));
            });
        })
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand);
    if response.clicked() {
        actions.push(Action::Select(record.id.clone()));
    }
}

pub fn sidebar(ui: &mut egui::Ui, dashboard: &Dashboard, actions: &mut Vec<Action>) {
    ui::section_header(ui, &format!("My check-ins (first {USER_HISTORY_LIMIT})"));
    let history = dashboard.history();
    if history.is_empty() {
        ui.label(egui::RichText::new("No history yet").color(ui::MUTED));
    }
    for record in history {
        ui.horizontal(|ui| {
            let icon = if record.is_verified { "✅" } else { "🔒" };
            if ui.link(format!("{icon} {}", record.name)).clicked() {
                actions.push(Action::Select(record.id.clone()));
            }
        });
        ui.label(
            egui::RichText::new(ui::format_timestamp(record.timestamp))
                .small()
                .color(ui::MUTED),
        );
    }

    ui::section_header(ui, "About FHE");
    for (title, body) in FHE_NOTES {
        ui.label(egui::RichText::new(title).strong());
        ui.label(egui::RichText::new(body).color(ui::MUTED));
        ui.add_space(6.0);
    }

    ui.add_space(12.0);
    ui.label(
        egui::RichText::new(format!("build {}", env!("GIT_HASH")))
            .small()
            .color(ui::MUTED),
    )
    .on_hover_text(env!("BUILD_TIME"));
}

pub fn create_window(ctx: &egui::Context, dashboard: &mut Dashboard, actions: &mut Vec<Action>) {
    if !dashboard.show_create {
        return;
    }
    let creating = dashboard.is_creating();
    let mut open = true;
    egui::Window::new("New private check-in")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.label(egui::RichText::new("FHE location encryption 🔐").strong());
                ui.label(
                    egui::RichText::new("Latitude is encrypted before it leaves this machine.")
                        .color(ui::MUTED),
                );
            });
            ui.add_space(8.0);

            let draft = &mut dashboard.draft;
            egui::Grid::new("create_form")
                .num_columns(3)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Location name *");
                    ui.add(
                        egui::TextEdit::singleline(&mut draft.name)
                            .hint_text("Enter a place name..."),
                    );
                    ui.label("");
                    ui.end_row();

                    ui.label("Latitude *");
                    ui.add(
                        egui::TextEdit::singleline(&mut draft.latitude).hint_text("e.g. 39.9042"),
                    );
                    ui.label(egui::RichText::new("FHE encrypted").color(ui::ACCENT));
                    ui.end_row();

                    ui.label("Longitude *");
                    ui.add(
                        egui::TextEdit::singleline(&mut draft.longitude)
                            .hint_text("e.g. 116.4074"),
                    );
                    ui.label(egui::RichText::new("Public").color(ui::MUTED));
                    ui.end_row();
                });

            if draft.is_complete() {
                if let Err(e) = draft.validate() {
                    ui.label(egui::RichText::new(e.to_string()).color(ui::ERROR));
                }
            }

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui::secondary_button(ui, "Cancel", !creating).clicked() {
                    actions.push(Action::CloseCreate);
                }
                let label = if creating {
                    "Encrypting and submitting..."
                } else {
                    "Create check-in"
                };
                if ui::primary_button(ui, label, dashboard.can_submit_create()).clicked() {
                    actions.push(Action::SubmitCreate);
                }
            });
        });
    if !open {
        actions.push(Action::CloseCreate);
    }
}

pub fn detail_window(
    ctx: &egui::Context,
    dashboard: &Dashboard,
    chain_name: &str,
    actions: &mut Vec<Action>,
) {
    let Some(id) = dashboard.selected.clone() else {
        return;
    };
    let Some(record) = dashboard.record(&id) else {
        actions.push(Action::CloseDetail);
        return;
    };
    let latitude = dashboard.latitude_view(&id);
    let decrypting = dashboard.is_decrypting();

    let mut open = true;
    egui::Window::new("Check-in details")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui::labeled_value(ui, "Location", egui::RichText::new(&record.name).strong());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Creator:").strong());
                let address = record.creator.to_string();
                if ui
                    .link(egui::RichText::new(ui::short_address(&record.creator)).monospace())
                    .on_hover_text("Open in block explorer")
                    .clicked()
                {
                    ui::open_url_new_tab(&ui::explorer_address_url(chain_name, &record.creator));
                }
                if ui.small_button("📋").on_hover_text("Copy to clipboard").clicked() {
                    ui::copy_to_clipboard(&address);
                }
            });
            ui::labeled_value(ui, "Checked in", ui::format_timestamp(record.timestamp));

            ui::section_header(ui, "Location data");
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Latitude:").strong());
                match latitude {
                    LatitudeView::Verified(deg) => {
                        ui.label(egui::RichText::new(ui::format_degrees(deg)).monospace());
                        ui.label(egui::RichText::new("(verified on-chain)").color(ui::SUCCESS));
                    }
                    LatitudeView::LocallyDecrypted(deg) => {
                        ui.label(egui::RichText::new(ui::format_degrees(deg)).monospace());
                        ui.label(egui::RichText::new("(decrypted locally)").color(ui::PENDING));
                    }
                    LatitudeView::Redacted => {
                        ui.label(egui::RichText::new(ui::REDACTED_COORDINATE).monospace());
                        ui.label(egui::RichText::new("🔒 FHE encrypted").color(ui::MUTED));
                    }
                }
            });
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Longitude:").strong());
                let longitude = ui::format_degrees(record.longitude_degrees());
                ui.label(egui::RichText::new(longitude).monospace());
                ui.label(egui::RichText::new("(public)").color(ui::MUTED));
            });

            ui.add_space(8.0);
            let label = if decrypting {
                "Verifying..."
            } else if record.is_verified {
                "✅ Verified"
            } else {
                "🔓 Verify decryption"
            };
            if ui::primary_button(ui, label, dashboard.can_decrypt(&id)).clicked() {
                actions.push(Action::Decrypt(id.clone()));
            }

            ui.add_space(8.0);
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.label(egui::RichText::new("🛡️ Privacy").strong());
                ui.label(
                    egui::RichText::new(
                        "Coordinates stay encrypted until a decryption proof is verified on-chain.",
                    )
                    .color(ui::MUTED),
                );
            });
        });
    if !open {
        actions.push(Action::CloseDetail);
    }
}

pub fn toast(ctx: &egui::Context, toast: &StatusToast) {
    if !toast.is_visible() {
        return;
    }
    let color = ui::phase_color(toast.phase());
    egui::Area::new(egui::Id::new("status_toast"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -16.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .stroke(egui::Stroke::new(1.0, color))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if toast.phase() == StatusPhase::Pending {
                            ui.spinner();
                        } else {
                            ui.label(ui::phase_icon(toast.phase()));
                        }
                        ui.label(egui::RichText::new(toast.message()).color(color));
                    });
                });
        });
}
