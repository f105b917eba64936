//! Main application shell: owns the dashboard, dispatches port calls to the
//! background runtime and folds their results back in on the next frame.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::Address;
use eframe::egui;

use privacy_checkin_adapters::{CheckInConfig, CheckInRuntime};
use privacy_checkin_core::{
    ClockPort, CreateOutcome, Dashboard, DecryptOutcome, LoadOutcome, PortError, RecordFilter,
    RecordId, StatusToast, TimestampMs,
};

use crate::ui;
use crate::views::{self, Action};

const FILTER_STORAGE_KEY: &str = "record_filter";

/// Result handed back from a background task
type Slot<T> = Arc<Mutex<Option<T>>>;

fn slot<T>() -> Slot<T> {
    Arc::new(Mutex::new(None))
}

fn take<T>(slot: &Slot<T>) -> Option<T> {
    slot.lock().ok().and_then(|mut guard| guard.take())
}

pub struct App {
    chain_name: String,
    service: Arc<CheckInRuntime>,
    runtime: tokio::runtime::Runtime,
    dashboard: Dashboard,
    connecting: bool,
    /// Set between a successful connect and the end of FHE initialization
    initializing: bool,
    connect_result: Slot<Result<Address, PortError>>,
    init_result: Slot<Result<(), PortError>>,
    load_result: Slot<Result<LoadOutcome, PortError>>,
    create_result: Slot<Result<CreateOutcome, PortError>>,
    decrypt_result: Slot<(RecordId, Result<DecryptOutcome, PortError>)>,
    availability_result: Slot<Result<bool, PortError>>,
    /// Latest pending message from a running create or decrypt
    progress: Slot<String>,
}

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: CheckInConfig,
        service: CheckInRuntime,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        let mut dashboard = Dashboard::with_toast(StatusToast::with_timeouts(
            config.success_toast_ms,
            config.error_toast_ms,
        ));
        if let Some(filter) = cc
            .storage
            .and_then(|s| eframe::get_value::<RecordFilter>(s, FILTER_STORAGE_KEY))
        {
            dashboard.filter = filter;
        }

        Self {
            chain_name: config.chain_name,
            service: Arc::new(service),
            runtime,
            dashboard,
            connecting: false,
            initializing: false,
            connect_result: slot(),
            init_result: slot(),
            load_result: slot(),
            create_result: slot(),
            decrypt_result: slot(),
            availability_result: slot(),
            progress: slot(),
        }
    }

    fn now(&self) -> TimestampMs {
        TimestampMs(self.service.clock.now_ms().unwrap_or_default())
    }

    fn dispatch<T, F>(&self, ctx: &egui::Context, target: &Slot<T>, job: F)
    where
        T: Send + 'static,
        F: FnOnce(&CheckInRuntime) -> T + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let target = Arc::clone(target);
        let ctx = ctx.clone();
        self.runtime.spawn_blocking(move || {
            let value = job(&service);
            if let Ok(mut guard) = target.lock() {
                *guard = Some(value);
            }
            ctx.request_repaint();
        });
    }

    /// Forwards pending messages from a background task to the toast.
    fn progress_sink(&self, ctx: &egui::Context) -> impl FnMut(&str) + Send + 'static {
        let progress = Arc::clone(&self.progress);
        let ctx = ctx.clone();
        move |message: &str| {
            if let Ok(mut guard) = progress.lock() {
                *guard = Some(message.to_owned());
            }
            ctx.request_repaint();
        }
    }

    fn handle(&mut self, ctx: &egui::Context, action: Action) {
        let now = self.now();
        match action {
            Action::Connect => {
                if self.connecting {
                    return;
                }
                self.connecting = true;
                self.dispatch(ctx, &self.connect_result, |s| s.connect_wallet());
            }
            Action::Refresh => self.start_load(ctx),
            Action::TestAvailability => {
                self.dispatch(ctx, &self.availability_result, |s| s.check_availability());
            }
            Action::OpenCreate => {
                if self.dashboard.can_open_create() {
                    self.dashboard.show_create = true;
                }
            }
            Action::CloseCreate => {
                if !self.dashboard.is_creating() {
                    self.dashboard.show_create = false;
                }
            }
            Action::SubmitCreate => {
                if self.dashboard.begin_create(now).is_err() {
                    return;
                }
                let account = self.dashboard.account;
                let draft = self.dashboard.draft.clone();
                let mut progress = self.progress_sink(ctx);
                self.dispatch(ctx, &self.create_result, move |s| {
                    s.create_check_in(account, &draft, &mut progress)
                });
            }
            Action::Select(id) => self.dashboard.selected = Some(id),
            Action::CloseDetail => self.dashboard.selected = None,
            Action::Decrypt(id) => {
                if self.dashboard.begin_decrypt(&id, now).is_err() {
                    return;
                }
                let account = self.dashboard.account;
                let mut progress = self.progress_sink(ctx);
                self.dispatch(ctx, &self.decrypt_result, move |s| {
                    let result = s.decrypt_record(account, &id, &mut progress);
                    (id, result)
                });
            }
        }
    }

    fn start_load(&mut self, ctx: &egui::Context) {
        if self.dashboard.begin_load().is_ok() {
            self.dispatch(ctx, &self.load_result, |s| s.load_records());
        }
    }

    fn poll_results(&mut self, ctx: &egui::Context) {
        let now = self.now();

        if let Some(result) = take(&self.connect_result) {
            self.connecting = false;
            match result {
                Ok(account) => {
                    self.dashboard.connected(account);
                    self.initializing = true;
                    self.dispatch(ctx, &self.init_result, |s| s.initialize_fhe());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "wallet connection failed");
                    self.dashboard.connect_failed(&e, now);
                }
            }
        }

        if let Some(result) = take(&self.init_result) {
            self.initializing = false;
            self.dashboard.finish_init(result, now);
            self.start_load(ctx);
        }

        if let Some(result) = take(&self.load_result) {
            self.dashboard.finish_load(result, now);
        }

        if let Some(message) = take(&self.progress) {
            if self.dashboard.is_creating() || self.dashboard.is_decrypting() {
                self.dashboard.progress(&message);
            }
        }

        if let Some(result) = take(&self.create_result) {
            self.dashboard.finish_create(result, now);
        }

        if let Some((id, result)) = take(&self.decrypt_result) {
            if let Some(value) = self.dashboard.finish_decrypt(&id, result, now) {
                tracing::debug!(record = %id, value, "latitude revealed");
            }
        }

        if let Some(result) = take(&self.availability_result) {
            self.dashboard.finish_availability(result, now);
        }
    }

    fn schedule_toast_expiry(&mut self, ctx: &egui::Context) {
        let now = self.now();
        self.dashboard.tick(now);
        if let Some(at) = self.dashboard.toast.dismiss_at() {
            ctx.request_repaint_after(Duration::from_millis(at.0.saturating_sub(now.0)));
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.poll_results(ctx);
        self.schedule_toast_expiry(ctx);

        let mut actions = Vec::new();

        if !self.dashboard.is_connected() {
            egui::CentralPanel::default()
                .show(ctx, |ui| views::intro(ui, self.connecting, &mut actions));
        } else if self.initializing {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui::loading_screen(
                    ui,
                    "Initializing FHE encryption...",
                    "Preparing the privacy environment",
                )
            });
        } else if self.dashboard.initial_load {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui::loading_screen(
                    ui,
                    "Loading private check-ins...",
                    "Reading records from the contract",
                )
            });
        } else {
            egui::TopBottomPanel::top("header").show(ctx, |ui| {
                views::header(ui, &self.dashboard, &self.chain_name, &mut actions);
            });
            egui::SidePanel::right("sidebar")
                .resizable(false)
                .default_width(260.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("sidebar_scroll")
                        .show(ui, |ui| views::sidebar(ui, &self.dashboard, &mut actions));
                });
            egui::CentralPanel::default().show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(10.0);
                    views::stats(ui, &self.dashboard);
                    ui.add_space(10.0);
                    views::controls(ui, &mut self.dashboard, &mut actions);
                    views::record_list(ui, &self.dashboard, &mut actions);
                    ui.add_space(20.0);
                });
            });
            views::create_window(ctx, &mut self.dashboard, &mut actions);
            views::detail_window(ctx, &self.dashboard, &self.chain_name, &mut actions);
        }

        views::toast(ctx, &self.dashboard.toast);

        for action in actions {
            self.handle(ctx, action);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, FILTER_STORAGE_KEY, &self.dashboard.filter);
    }
}
