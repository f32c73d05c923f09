//! Platform service — use-cases for addressing, rules and switch frames.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use pkone_domain::address::{CoilAddress, ServoAddress, SwitchAddress};
use pkone_domain::board::ExpansionBoard;
use pkone_domain::command::Command;
use pkone_domain::cross_board;
use pkone_domain::driver;
use pkone_domain::error::PkoneError;
use pkone_domain::frame::{decode_frame, InboundFrame};
use pkone_domain::number;
use pkone_domain::registry::BoardRegistry;
use pkone_domain::rule::{self, HardwareRule, HoldSettings, PulseSettings};
use pkone_domain::servo;
use pkone_domain::switch_state::{SwitchSnapshot, SwitchStateEvent};

use crate::ports::{CommandSink, SwitchEventPublisher};
use crate::watchdog::Watchdog;

/// Application service driving one chain of PKONE boards.
///
/// The registry, the last known switch states and the watchdog are shared
/// state, so the service can sit behind an `Arc` and serve the frame reader
/// and the application concurrently.
pub struct PlatformService<S, P> {
    registry: RwLock<BoardRegistry>,
    sink: Arc<S>,
    publisher: P,
    switch_states: Mutex<SwitchSnapshot>,
    watchdog: Mutex<Watchdog>,
}

impl<S, P> PlatformService<S, P>
where
    S: CommandSink + Send + Sync + 'static,
    P: SwitchEventPublisher,
{
    /// Create a service with an empty registry and a stopped watchdog.
    pub fn new(sink: S, publisher: P, watchdog_period: Duration) -> Self {
        Self {
            registry: RwLock::new(BoardRegistry::new()),
            sink: Arc::new(sink),
            publisher,
            switch_states: Mutex::new(SwitchSnapshot::new()),
            watchdog: Mutex::new(Watchdog::new(watchdog_period)),
        }
    }

    /// Register a discovered extension board.
    ///
    /// # Errors
    ///
    /// Returns [`PkoneError::Registry`] for a duplicate or out-of-range address.
    #[tracing::instrument(skip(self, board), fields(address_id = board.address_id))]
    pub fn register_extension_board(&self, board: ExpansionBoard) -> Result<(), PkoneError> {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry.register_extension(board)?;
        tracing::info!("extension board registered");
        Ok(())
    }

    /// Register a discovered lightshow board.
    ///
    /// # Errors
    ///
    /// Returns [`PkoneError::Registry`] for a duplicate or out-of-range address.
    #[tracing::instrument(skip(self, board), fields(address_id = board.address_id))]
    pub fn register_lightshow_board(&self, board: ExpansionBoard) -> Result<(), PkoneError> {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry.register_lightshow(board)?;
        tracing::info!("lightshow board registered");
        Ok(())
    }

    /// Resolve a switch number such as `"1-12"`.
    ///
    /// # Errors
    ///
    /// Returns [`PkoneError::Parse`] when the number is malformed, names an
    /// unknown board or is beyond the board's switches.
    pub fn configure_switch(&self, number: &str) -> Result<SwitchAddress, PkoneError> {
        let address = number::parse_switch(number, &self.read_registry())?;
        tracing::debug!(number, %address, "switch configured");
        Ok(address)
    }

    /// Resolve a coil number such as `"0-3"`.
    ///
    /// # Errors
    ///
    /// Returns [`PkoneError::Parse`] when the number is malformed, names an
    /// unknown board or is beyond the board's coils.
    pub fn configure_coil(&self, number: &str) -> Result<CoilAddress, PkoneError> {
        let address = number::parse_coil(number, &self.read_registry())?;
        tracing::debug!(number, %address, "coil configured");
        Ok(address)
    }

    /// Resolve a servo number; servos are numbered after the board's coils.
    ///
    /// # Errors
    ///
    /// Returns [`PkoneError::Parse`] when the number is malformed, names an
    /// unknown board or falls outside the board's servo window.
    pub fn configure_servo(&self, number: &str) -> Result<ServoAddress, PkoneError> {
        let address = number::parse_servo(number, &self.read_registry())?;
        tracing::debug!(number, %address, "servo configured");
        Ok(address)
    }

    /// Pulse `coil` on every hit of `enable_switch`.
    ///
    /// # Errors
    ///
    /// See [`apply_rule`](Self::apply_rule).
    #[tracing::instrument(skip(self))]
    pub async fn set_pulse_on_hit_rule(
        &self,
        coil: CoilAddress,
        enable_switch: SwitchAddress,
        pulse: PulseSettings,
    ) -> Result<(), PkoneError> {
        self.apply_rule(&HardwareRule::pulse_on_hit(coil, enable_switch, pulse))
            .await
    }

    /// Pulse `coil` once `enable_switch` has been active for `delay_ms`.
    ///
    /// # Errors
    ///
    /// See [`apply_rule`](Self::apply_rule).
    #[tracing::instrument(skip(self))]
    pub async fn set_delayed_pulse_on_hit_rule(
        &self,
        coil: CoilAddress,
        enable_switch: SwitchAddress,
        delay_ms: u32,
        pulse: PulseSettings,
    ) -> Result<(), PkoneError> {
        let rule = HardwareRule::delayed_pulse_on_hit(coil, enable_switch, delay_ms, pulse);
        self.apply_rule(&rule).await
    }

    /// Pulse `coil` on hit and cancel the pulse on release.
    ///
    /// # Errors
    ///
    /// See [`apply_rule`](Self::apply_rule).
    #[tracing::instrument(skip(self))]
    pub async fn set_pulse_on_hit_and_release_rule(
        &self,
        coil: CoilAddress,
        enable_switch: SwitchAddress,
        pulse: PulseSettings,
        hold: HoldSettings,
    ) -> Result<(), PkoneError> {
        let rule = HardwareRule::pulse_on_hit_and_release(coil, enable_switch, pulse, hold);
        self.apply_rule(&rule).await
    }

    /// Pulse then hold `coil` while `enable_switch` is active.
    ///
    /// # Errors
    ///
    /// See [`apply_rule`](Self::apply_rule).
    #[tracing::instrument(skip(self))]
    pub async fn set_pulse_on_hit_and_enable_and_release_rule(
        &self,
        coil: CoilAddress,
        enable_switch: SwitchAddress,
        pulse: PulseSettings,
        hold: HoldSettings,
    ) -> Result<(), PkoneError> {
        let rule =
            HardwareRule::pulse_on_hit_and_enable_and_release(coil, enable_switch, pulse, hold);
        self.apply_rule(&rule).await
    }

    /// Pulse `coil`, cancelled on release of `enable_switch` or on hit of
    /// `eos_switch`.
    ///
    /// # Errors
    ///
    /// See [`apply_rule`](Self::apply_rule).
    #[tracing::instrument(skip(self))]
    pub async fn set_pulse_on_hit_and_release_and_disable_rule(
        &self,
        coil: CoilAddress,
        enable_switch: SwitchAddress,
        eos_switch: SwitchAddress,
        pulse: PulseSettings,
        hold: HoldSettings,
    ) -> Result<(), PkoneError> {
        let rule = HardwareRule::pulse_on_hit_and_release_and_disable(
            coil,
            enable_switch,
            eos_switch,
            pulse,
            hold,
        );
        self.apply_rule(&rule).await
    }

    /// The board has no command for this rule.
    ///
    /// # Errors
    ///
    /// Always returns [`PkoneError::Encode`] with
    /// `UnsupportedHardwareFeature`; nothing is sent.
    #[tracing::instrument(skip(self))]
    pub async fn set_pulse_on_hit_and_enable_and_release_and_disable_rule(
        &self,
        coil: CoilAddress,
        enable_switch: SwitchAddress,
        eos_switch: SwitchAddress,
        pulse: PulseSettings,
        hold: HoldSettings,
    ) -> Result<(), PkoneError> {
        let rule = HardwareRule::pulse_on_hit_and_enable_and_release_and_disable(
            coil,
            enable_switch,
            eos_switch,
            pulse,
            hold,
        );
        self.apply_rule(&rule).await
    }

    /// Encode, validate and send a hardware rule.
    ///
    /// The rule is encoded first, so an unsupported kind is reported before
    /// any board check.
    ///
    /// # Errors
    ///
    /// - [`PkoneError::Encode`] for an unsupported kind, a missing field or a
    ///   setting out of range
    /// - [`PkoneError::CrossBoard`] when the enable or EOS switch is not on
    ///   the coil's board, or either address is past its board's count
    /// - a transport error from the command sink
    pub async fn apply_rule(&self, rule: &HardwareRule) -> Result<(), PkoneError> {
        let command = rule::encode(rule)?;
        {
            let registry = self.read_registry();
            cross_board::same_board(rule.enable_switch, rule.coil, &registry)?;
            if let Some(eos) = rule.eos_switch {
                cross_board::same_board(eos, rule.coil, &registry)?;
            }
        }
        tracing::info!(kind = %rule.kind, coil = %rule.coil, "hardware rule set");
        self.send(&command).await
    }

    /// Remove whatever rule `coil` carries. Safe to repeat.
    ///
    /// # Errors
    ///
    /// Returns [`PkoneError::Parse`] when `coil` is not on a registered
    /// board, or a transport error from the command sink.
    #[tracing::instrument(skip(self))]
    pub async fn clear_hw_rule(&self, coil: CoilAddress) -> Result<(), PkoneError> {
        self.check_coil(coil)?;
        self.send(&rule::clear(coil)).await
    }

    /// Fire `coil` once.
    ///
    /// # Errors
    ///
    /// Returns [`PkoneError::Parse`] for a coil unknown to the registry,
    /// [`PkoneError::Encode`] for settings out of range, or a transport error.
    #[tracing::instrument(skip(self))]
    pub async fn pulse_coil(&self, coil: CoilAddress, pulse: PulseSettings) -> Result<(), PkoneError> {
        self.check_coil(coil)?;
        let command = driver::pulse(coil, pulse)?;
        self.send(&command).await
    }

    /// Pulse then hold `coil` until [`disable_coil`](Self::disable_coil).
    ///
    /// # Errors
    ///
    /// Same as [`pulse_coil`](Self::pulse_coil).
    #[tracing::instrument(skip(self))]
    pub async fn enable_coil(
        &self,
        coil: CoilAddress,
        pulse: PulseSettings,
        hold: HoldSettings,
    ) -> Result<(), PkoneError> {
        self.check_coil(coil)?;
        let command = driver::enable(coil, pulse, hold)?;
        self.send(&command).await
    }

    /// # Errors
    ///
    /// Returns [`PkoneError::Parse`] for a coil unknown to the registry, or a
    /// transport error from the command sink.
    #[tracing::instrument(skip(self))]
    pub async fn disable_coil(&self, coil: CoilAddress) -> Result<(), PkoneError> {
        self.check_coil(coil)?;
        self.send(&driver::disable(coil)).await
    }

    /// Move `servo` to `position` (`0.0..=1.0`).
    ///
    /// # Errors
    ///
    /// Returns [`PkoneError::Encode`] with `PositionOutOfRange` outside the
    /// unit range, [`PkoneError::Parse`] for a servo unknown to the registry,
    /// or a transport error.
    #[tracing::instrument(skip(self))]
    pub async fn servo_go_to_position(
        &self,
        servo: ServoAddress,
        position: f64,
    ) -> Result<(), PkoneError> {
        number::parse_servo(&servo.to_string(), &self.read_registry())?;
        let command = servo::encode_position(servo, position)?;
        self.send(&command).await
    }

    /// Decode one inbound frame, update the switch states and publish the
    /// resulting events.
    ///
    /// A snapshot replaces the stored states; a change updates one switch.
    /// The states are stored before any event goes out, and every event is
    /// offered to the publisher even when an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns [`PkoneError::Frame`] for an unknown board or a malformed
    /// frame; the stored states are left untouched and later frames are
    /// processed normally. The first publisher error is returned once all
    /// events have been offered.
    #[tracing::instrument(skip(self))]
    pub async fn receive_frame(&self, frame: &str) -> Result<InboundFrame, PkoneError> {
        let decoded = decode_frame(frame, &self.read_registry());
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::warn!(error = %err, "dropping inbound frame");
                return Err(err.into());
            }
        };

        let events: Vec<SwitchStateEvent> = {
            let mut states = self.lock_switch_states();
            match &decoded {
                InboundFrame::Snapshot(snapshot) => {
                    states.clone_from(snapshot);
                    snapshot.events().collect()
                }
                InboundFrame::Change(event) => {
                    states.apply(*event);
                    vec![*event]
                }
            }
        };

        tracing::debug!(events = events.len(), "switch frame decoded");
        let mut first_error = None;
        for event in events {
            if let Err(err) = self.publisher.publish(event).await {
                tracing::warn!(error = %err, switch = %event.address, "switch event not published");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(decoded),
        }
    }

    /// The last known state of every reported switch, keyed by number.
    pub fn hw_switch_states(&self) -> BTreeMap<String, bool> {
        self.lock_switch_states().to_number_map()
    }

    /// Start the heartbeat watchdog. Returns `false` when already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut watchdog = self.watchdog.lock().unwrap_or_else(PoisonError::into_inner);
        watchdog.start(Arc::clone(&self.sink))
    }

    /// Stop the watchdog and reset the board. Does nothing when not started.
    ///
    /// The reset is the last command sent; no heartbeat follows it.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the reset command cannot be sent.
    pub async fn stop(&self) -> Result<(), PkoneError> {
        let stopped = self
            .watchdog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop();
        if !stopped {
            return Ok(());
        }
        tracing::info!("platform stopping");
        self.send(&Command::Reset).await
    }

    pub fn is_running(&self) -> bool {
        self.watchdog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_running()
    }

    /// Human-readable summary of the registered boards.
    pub fn info_string(&self) -> String {
        let registry = self.read_registry();
        let mut info = String::from("Penny K Pinball Hardware\n------------------------\n");
        write_boards(&mut info, "Extension boards", registry.extensions());
        write_boards(&mut info, "Lightshow boards", registry.lightshows());
        info
    }

    async fn send(&self, command: &Command) -> Result<(), PkoneError> {
        tracing::debug!(%command, "sending");
        self.sink.send(command).await
    }

    fn check_coil(&self, coil: CoilAddress) -> Result<(), PkoneError> {
        number::parse_coil(&coil.to_string(), &self.read_registry())?;
        Ok(())
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, BoardRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_switch_states(&self) -> MutexGuard<'_, SwitchSnapshot> {
        self.switch_states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_boards<'a>(
    info: &mut String,
    title: &str,
    boards: impl Iterator<Item = &'a ExpansionBoard>,
) {
    let _ = write!(info, "\n - {title}:\n");
    for board in boards {
        let _ = writeln!(
            info,
            "   -> Address ID: {} (firmware v{}, hardware rev {})",
            board.address_id, board.firmware_version, board.hardware_revision
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::InProcessSwitchBus;
    use pkone_domain::error::ErrorKind;
    use std::future::Future;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<String>>,
    }

    impl CommandSink for RecordingSink {
        fn send(&self, command: &Command) -> impl Future<Output = Result<(), PkoneError>> + Send {
            self.sent.lock().unwrap().push(command.to_string());
            async { Ok(()) }
        }
    }

    type Service = PlatformService<RecordingSink, Arc<InProcessSwitchBus>>;

    fn make_service() -> (Service, Arc<InProcessSwitchBus>) {
        let bus = Arc::new(InProcessSwitchBus::new(64));
        let svc = PlatformService::new(
            RecordingSink::default(),
            Arc::clone(&bus),
            Duration::from_millis(500),
        );
        svc.register_extension_board(
            ExpansionBoard::builder(0)
                .coils(4)
                .switches(10)
                .servos(2)
                .firmware_version("1.1")
                .hardware_revision("2")
                .build(),
        )
        .unwrap();
        svc.register_extension_board(ExpansionBoard::builder(1).coils(6).switches(12).build())
            .unwrap();
        (svc, bus)
    }

    fn sent(svc: &Service) -> Vec<String> {
        svc.sink.sent.lock().unwrap().clone()
    }

    fn pulse() -> PulseSettings {
        PulseSettings {
            duration_ms: 10,
            power: 1.0,
        }
    }

    fn hold() -> HoldSettings {
        HoldSettings { power: 0.5 }
    }

    #[test]
    fn should_reject_duplicate_board_across_families() {
        let (svc, _) = make_service();
        let err = svc
            .register_lightshow_board(ExpansionBoard::builder(1).build())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateAddress);
    }

    #[test]
    fn should_configure_numbers_against_registered_boards() {
        let (svc, _) = make_service();
        assert_eq!(svc.configure_switch("1-11").unwrap(), SwitchAddress::new(1, 11));
        assert_eq!(svc.configure_coil("0-3").unwrap(), CoilAddress::new(0, 3));
        assert_eq!(svc.configure_servo("0-5").unwrap(), ServoAddress::new(0, 5));

        assert_eq!(
            svc.configure_coil("0-4").unwrap_err().kind(),
            ErrorKind::IndexOutOfRange
        );
        assert_eq!(
            svc.configure_switch("7-0").unwrap_err().kind(),
            ErrorKind::UnknownBoard
        );
        assert_eq!(
            svc.configure_servo("0x4").unwrap_err().kind(),
            ErrorKind::InvalidFormat
        );
    }

    #[tokio::test]
    async fn should_send_rule_when_switch_and_coil_share_board() {
        let (svc, _) = make_service();
        let coil = svc.configure_coil("1-2").unwrap();
        let switch = svc.configure_switch("1-4").unwrap();

        svc.set_pulse_on_hit_rule(coil, switch, pulse()).await.unwrap();

        assert_eq!(sent(&svc), vec!["PHR10211040000000001080E"]);
    }

    #[tokio::test]
    async fn should_reject_rule_when_switch_and_coil_on_different_boards() {
        let (svc, _) = make_service();
        let coil = svc.configure_coil("1-2").unwrap();
        let switch = svc.configure_switch("0-4").unwrap();

        let err = svc
            .set_pulse_on_hit_and_release_rule(coil, switch, pulse(), hold())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CrossBoardMismatch);
        assert!(sent(&svc).is_empty());
    }

    #[tokio::test]
    async fn should_reject_rule_when_eos_switch_on_other_board() {
        let (svc, _) = make_service();
        let coil = svc.configure_coil("1-0").unwrap();
        let enable = svc.configure_switch("1-0").unwrap();
        let eos = svc.configure_switch("0-1").unwrap();

        let err = svc
            .set_pulse_on_hit_and_release_and_disable_rule(coil, enable, eos, pulse(), hold())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CrossBoardMismatch);
    }

    #[tokio::test]
    async fn should_always_reject_single_wound_eos_rule() {
        let (svc, _) = make_service();
        // different boards: the unsupported kind still wins
        let coil = svc.configure_coil("1-0").unwrap();
        let enable = svc.configure_switch("0-0").unwrap();
        let eos = svc.configure_switch("0-1").unwrap();

        let err = svc
            .set_pulse_on_hit_and_enable_and_release_and_disable_rule(
                coil,
                enable,
                eos,
                pulse(),
                hold(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsupportedHardwareFeature);
        assert!(sent(&svc).is_empty());
    }

    #[tokio::test]
    async fn should_send_every_supported_rule_kind() {
        let (svc, _) = make_service();
        let coil = svc.configure_coil("0-1").unwrap();
        let enable = svc.configure_switch("0-2").unwrap();
        let eos = svc.configure_switch("0-3").unwrap();

        svc.set_delayed_pulse_on_hit_rule(coil, enable, 1500, pulse())
            .await
            .unwrap();
        svc.set_pulse_on_hit_and_enable_and_release_rule(coil, enable, pulse(), hold())
            .await
            .unwrap();
        svc.set_pulse_on_hit_and_release_and_disable_rule(coil, enable, eos, pulse(), hold())
            .await
            .unwrap();
        svc.clear_hw_rule(coil).await.unwrap();

        assert_eq!(
            sent(&svc),
            vec![
                "PHR00120020000150001080E",
                "PHR00140020000000001084E",
                "PHR00150021003000001084E",
                "PHD001E",
            ]
        );
    }

    #[tokio::test]
    async fn should_drive_coils_and_servos() {
        let (svc, _) = make_service();
        let coil = svc.configure_coil("1-5").unwrap();
        let servo = svc.configure_servo("0-4").unwrap();

        svc.pulse_coil(coil, pulse()).await.unwrap();
        svc.enable_coil(coil, pulse(), hold()).await.unwrap();
        svc.disable_coil(coil).await.unwrap();
        svc.servo_go_to_position(servo, 0.5).await.unwrap();

        assert_eq!(
            sent(&svc),
            vec!["PCP1050108E", "PCE10501084E", "PCD105E", "PSC004128E"]
        );

        let err = svc.servo_go_to_position(servo, 1.5).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PositionOutOfRange);
    }

    #[tokio::test]
    async fn should_reject_rule_with_switch_past_its_board() {
        let (svc, _) = make_service();
        // board 0 has 10 switches; index 15 would land in board 1's range
        let rule = HardwareRule::pulse_on_hit(
            CoilAddress::new(1, 0),
            SwitchAddress::new(0, 15),
            pulse(),
        );

        let err = svc.apply_rule(&rule).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CrossBoardMismatch);
        assert!(sent(&svc).is_empty());
    }

    #[tokio::test]
    async fn should_reject_rule_with_eos_past_its_board() {
        let (svc, _) = make_service();
        let rule = HardwareRule::pulse_on_hit_and_release_and_disable(
            CoilAddress::new(0, 1),
            SwitchAddress::new(0, 2),
            SwitchAddress::new(0, 10),
            pulse(),
            hold(),
        );

        let err = svc.apply_rule(&rule).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CrossBoardMismatch);
        assert!(sent(&svc).is_empty());
    }

    #[tokio::test]
    async fn should_name_switch_board_in_rule_command() {
        let (svc, _) = make_service();
        let coil = svc.configure_coil("1-5").unwrap();
        let switch = svc.configure_switch("1-11").unwrap();

        svc.set_pulse_on_hit_rule(coil, switch, pulse()).await.unwrap();

        let sent = sent(&svc);
        assert_eq!(&sent[0][7..10], "111");
    }

    #[tokio::test]
    async fn should_reject_coil_and_servo_commands_off_the_registry() {
        let (svc, _) = make_service();

        let err = svc
            .pulse_coil(CoilAddress::new(0, 4), pulse())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
        let err = svc.disable_coil(CoilAddress::new(5, 0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownBoard);
        // wire number 3 is still a coil on board 0
        let err = svc
            .servo_go_to_position(ServoAddress::new(0, 3), 0.5)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);

        assert!(sent(&svc).is_empty());
    }

    #[tokio::test]
    async fn should_store_snapshot_and_offer_every_event_when_publisher_fails() {
        #[derive(Default)]
        struct FailingPublisher {
            attempts: Mutex<usize>,
        }

        impl SwitchEventPublisher for FailingPublisher {
            fn publish(
                &self,
                _event: SwitchStateEvent,
            ) -> impl Future<Output = Result<(), PkoneError>> + Send {
                *self.attempts.lock().unwrap() += 1;
                async { Err(PkoneError::Transport("subscriber gone".into())) }
            }
        }

        let svc = PlatformService::new(
            RecordingSink::default(),
            FailingPublisher::default(),
            Duration::from_millis(500),
        );
        svc.register_extension_board(ExpansionBoard::builder(0).switches(3).build())
            .unwrap();

        let err = svc.receive_frame("PSA0101E").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(*svc.publisher.attempts.lock().unwrap(), 3);
        assert_eq!(svc.hw_switch_states().len(), 3);
        assert_eq!(svc.hw_switch_states().get("0-2"), Some(&true));
    }

    #[tokio::test]
    async fn should_replace_switch_states_on_snapshot_and_publish_events() {
        let (svc, bus) = make_service();
        let mut rx = bus.subscribe();

        svc.receive_frame("PSA010X1001E").await.unwrap();

        let states = svc.hw_switch_states();
        assert_eq!(states.len(), 5);
        assert_eq!(states.get("0-0"), Some(&true));
        assert_eq!(states.get("0-1"), Some(&false));
        assert_eq!(states.get("1-2"), Some(&true));
        assert_eq!(states.get("1-0"), Some(&false));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.address, SwitchAddress::new(0, 0));

        svc.receive_frame("PSA11E").await.unwrap();
        let states = svc.hw_switch_states();
        assert_eq!(states.len(), 1);
        assert_eq!(states.get("1-0"), Some(&true));
    }

    #[tokio::test]
    async fn should_update_single_switch_on_change() {
        let (svc, bus) = make_service();
        let mut rx = bus.subscribe();
        svc.receive_frame("PSA000E").await.unwrap();

        svc.receive_frame("PSW0011E").await.unwrap();

        assert_eq!(svc.hw_switch_states().get("0-1"), Some(&true));
        assert_eq!(svc.hw_switch_states().get("0-0"), Some(&false));

        // two from the snapshot, then the change
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();
        let change = rx.recv().await.unwrap();
        assert_eq!(change.address, SwitchAddress::new(0, 1));
        assert!(change.active);
    }

    #[tokio::test]
    async fn should_keep_states_when_frame_is_malformed() {
        let (svc, _) = make_service();
        svc.receive_frame("PSW0011E").await.unwrap();

        let err = svc.receive_frame("PSW0012E").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedFrame);
        assert!(err.is_recoverable());

        let err = svc.receive_frame("PSW5011E").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownBoard);

        assert_eq!(svc.hw_switch_states().get("0-1"), Some(&true));
        svc.receive_frame("PSW0010E").await.unwrap();
        assert_eq!(svc.hw_switch_states().get("0-1"), Some(&false));
    }

    #[tokio::test(start_paused = true)]
    async fn should_reset_board_once_when_stopped() {
        let (svc, _) = make_service();
        assert!(svc.start());
        assert!(!svc.start());
        tokio::time::sleep(Duration::from_millis(10)).await;

        svc.stop().await.unwrap();
        svc.stop().await.unwrap();

        assert!(!svc.is_running());
        assert_eq!(sent(&svc), vec!["PWDE", "PRSE"]);
    }

    #[tokio::test]
    async fn should_not_reset_when_never_started() {
        let (svc, _) = make_service();
        svc.stop().await.unwrap();
        assert!(sent(&svc).is_empty());
    }

    #[test]
    fn should_list_boards_in_info_string() {
        let (svc, _) = make_service();
        svc.register_lightshow_board(
            ExpansionBoard::builder(3)
                .firmware_version("1.0")
                .hardware_revision("1")
                .build(),
        )
        .unwrap();

        let info = svc.info_string();
        assert!(info.contains(" - Extension boards:\n   -> Address ID: 0 (firmware v1.1, hardware rev 2)"));
        assert!(info.contains("   -> Address ID: 1 (firmware v"));
        assert!(info.contains(" - Lightshow boards:\n   -> Address ID: 3 (firmware v1.0, hardware rev 1)"));
    }
}
