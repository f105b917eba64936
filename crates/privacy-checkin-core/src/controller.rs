use crate::dashboard::{Dashboard, Refusal};
use crate::domain::{RecordId, TimestampMs};
use crate::ports::{ClockPort, ContractPort, FhePort, ProviderPort};
use crate::service::CheckInService;

/// Runs dashboard actions to completion on the calling thread.
pub struct CheckInController<P, C, F, K>
where
    P: ProviderPort,
    C: ContractPort,
    F: FhePort,
    K: ClockPort,
{
    pub service: CheckInService<P, C, F, K>,
    pub dashboard: Dashboard,
}

impl<P, C, F, K> CheckInController<P, C, F, K>
where
    P: ProviderPort,
    C: ContractPort,
    F: FhePort,
    K: ClockPort,
{
    pub fn new(service: CheckInService<P, C, F, K>, dashboard: Dashboard) -> Self {
        Self { service, dashboard }
    }

    pub fn now(&self) -> TimestampMs {
        TimestampMs(self.service.clock.now_ms().unwrap_or_default())
    }

    /// Connects, initializes the FHE client and performs the first load.
    pub fn connect_wallet(&mut self) -> bool {
        let now = self.now();
        match self.service.connect_wallet() {
            Ok(account) => {
                self.dashboard.connected(account);
                self.initialize_fhe();
                self.load_data();
                true
            }
            Err(e) => {
                self.dashboard.connect_failed(&e, now);
                false
            }
        }
    }

    pub fn initialize_fhe(&mut self) {
        let result = self.service.initialize_fhe();
        let now = self.now();
        self.dashboard.finish_init(result, now);
    }

    pub fn load_data(&mut self) {
        if self.dashboard.begin_load().is_err() {
            return;
        }
        let result = self.service.load_records();
        let now = self.now();
        self.dashboard.finish_load(result, now);
    }

    pub fn create_check_in(&mut self) -> Result<(), Refusal> {
        let now = self.now();
        self.dashboard.begin_create(now)?;
        let draft = self.dashboard.draft.clone();
        let account = self.dashboard.account;
        let dashboard = &mut self.dashboard;
        let result = self
            .service
            .create_check_in(account, &draft, &mut |msg| dashboard.progress(msg));
        let now = self.now();
        self.dashboard.finish_create(result, now);
        Ok(())
    }

    /// Returns the latitude in micro-degrees, if it became known.
    pub fn decrypt_data(&mut self, id: &RecordId) -> Option<u32> {
        let now = self.now();
        match self.dashboard.begin_decrypt(id, now) {
            Ok(()) => {}
            Err(Refusal::AlreadyVerified) => {
                return self.dashboard.record(id).and_then(|r| r.decrypted_value);
            }
            Err(_) => return None,
        }
        let account = self.dashboard.account;
        let dashboard = &mut self.dashboard;
        let result = self
            .service
            .decrypt_record(account, id, &mut |msg| dashboard.progress(msg));
        let now = self.now();
        self.dashboard.finish_decrypt(id, result, now)
    }

    pub fn test_availability(&mut self) {
        let result = self.service.check_availability();
        let now = self.now();
        self.dashboard.finish_availability(result, now);
    }

    pub fn tick(&mut self) -> bool {
        let now = self.now();
        self.dashboard.tick(now)
    }
}
