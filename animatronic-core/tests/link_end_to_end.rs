//! Controller and puppet wired together through an in-memory broadcast link.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use animatronic_core::{
    ActuatorDriver, ActuatorError, Angle, Axis, Button, Channel, Clock, Controller,
    ControllerConfig, Duration, InputSampler, Instant, Puppet, PuppetConfig, PuppetEvent,
    SafetyState, SamplerError, Transport, TransportError, VolatileStore,
};

type Air = Rc<RefCell<VecDeque<Vec<u8>>>>;

/// One end of the shared medium. Every `lose_every`-th datagram sent is lost.
struct Radio {
    air: Air,
    lose_every: usize,
    sent: usize,
}

impl Radio {
    fn pair() -> (Radio, Radio) {
        let air = Air::default();
        (
            Radio {
                air: air.clone(),
                lose_every: 0,
                sent: 0,
            },
            Radio {
                air,
                lose_every: 0,
                sent: 0,
            },
        )
    }
}

impl Transport for Radio {
    fn send(&mut self, payload: &[u8]) -> impl Future<Output = Result<(), TransportError>> {
        self.sent += 1;
        let lost = self.lose_every > 0 && self.sent % self.lose_every == 0;
        if !lost {
            self.air.borrow_mut().push_back(payload.to_vec());
        }
        std::future::ready(Ok(()))
    }

    fn receive(
        &mut self,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<Option<usize>, TransportError>> {
        let result = match self.air.borrow_mut().pop_front() {
            Some(datagram) if datagram.len() > buf.len() => Err(TransportError::Oversize),
            Some(datagram) => {
                buf[..datagram.len()].copy_from_slice(&datagram);
                Ok(Some(datagram.len()))
            }
            None => Ok(None),
        };
        std::future::ready(result)
    }
}

struct Sticks {
    axes: [u16; 4],
    primary: bool,
    secondary: bool,
}

impl InputSampler for Sticks {
    fn read_axis(&mut self, axis: Axis) -> Result<u16, SamplerError> {
        Ok(self.axes[axis as usize])
    }

    fn read_button(&mut self, button: Button) -> bool {
        match button {
            Button::Primary => self.primary,
            Button::Secondary => self.secondary,
        }
    }
}

#[derive(Default)]
struct Servos {
    writes: usize,
}

impl ActuatorDriver for Servos {
    fn init(&mut self) -> Result<(), ActuatorError> {
        Ok(())
    }

    fn set_channel_angle(&mut self, _channel: Channel, _angle: Angle) -> Result<(), ActuatorError> {
        self.writes += 1;
        Ok(())
    }
}

#[derive(Default)]
struct TestClock {
    now: Cell<u64>,
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.now.get())
    }

    fn delay(&self, duration: Duration) -> impl Future<Output = ()> {
        self.now.set(self.now.get() + duration.as_millis() as u64);
        std::future::ready(())
    }
}

fn block_on<F: Future>(mut f: F) -> F::Output {
    fn noop_raw_waker() -> RawWaker {
        fn noop(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            noop_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
    let mut cx = Context::from_waker(&waker);

    // SAFETY: We don't move f after pinning
    let mut f = unsafe { Pin::new_unchecked(&mut f) };

    match f.as_mut().poll(&mut cx) {
        Poll::Ready(result) => result,
        Poll::Pending => panic!("Mock future returned Pending unexpectedly"),
    }
}

struct Rig {
    clock: TestClock,
    air: Air,
    controller: Controller<Sticks, Radio, VolatileStore>,
    puppet: Puppet<Radio, Servos>,
    events: Vec<PuppetEvent>,
}

impl Rig {
    fn new() -> Self {
        let clock = TestClock::default();
        let (tx, rx) = Radio::pair();
        let air = tx.air.clone();
        let controller = Controller::new(
            Sticks {
                axes: [2048; 4],
                primary: false,
                secondary: false,
            },
            tx,
            VolatileStore::new(),
            ControllerConfig::DEFAULT,
        );
        let mut puppet = Puppet::new(rx, Servos::default(), PuppetConfig::DEFAULT, clock.now());
        block_on(puppet.start(&clock)).unwrap();

        Self {
            clock,
            air,
            controller,
            puppet,
            events: Vec::new(),
        }
    }

    fn buttons(&mut self, primary: bool, secondary: bool) {
        let sticks = self.controller.sampler_mut();
        sticks.primary = primary;
        sticks.secondary = secondary;
    }

    /// Drain the air and service the puppet once at the current time.
    fn deliver(&mut self) {
        loop {
            let waiting = !self.air.borrow().is_empty();
            if let Some(event) = block_on(self.puppet.process_one(&self.clock)) {
                self.events.push(event);
            }
            if !waiting {
                break;
            }
        }
    }

    /// One controller tick at `ms`, then delivery.
    fn tick(&mut self, ms: u64) {
        self.clock.now.set(ms);
        block_on(self.controller.tick(Instant::from_millis(ms)));
        self.deliver();
    }

    /// Hold the buttons and tick every 50 ms over `[from, to)`.
    fn hold(&mut self, from: u64, to: u64, primary: bool, secondary: bool) {
        self.buttons(primary, secondary);
        for ms in (from..to).step_by(50) {
            self.tick(ms);
        }
    }

    fn unlock(&mut self, start: u64) {
        for i in 0..3 {
            let t = start + i * 100;
            self.hold(t, t + 50, true, false);
            self.hold(t + 50, t + 100, false, false);
        }
    }
}

#[test]
fn test_full_session() {
    let mut rig = Rig::new();

    rig.hold(0, 200, false, false);
    assert_eq!(rig.puppet.state(), SafetyState::Locked);
    assert!(rig.events.contains(&PuppetEvent::Heartbeat));

    rig.unlock(200);
    assert!(!rig.controller.is_locked());
    assert_eq!(rig.puppet.state(), SafetyState::Active);

    rig.controller.sampler_mut().axes[0] = 4095;
    rig.controller.sampler_mut().axes[2] = 0;
    rig.hold(500, 600, false, false);
    assert_eq!(rig.puppet.angle(Channel::EyeH), Angle::MAX);
    assert_eq!(rig.puppet.angle(Channel::NeckLr), Angle::MAX);
    assert_eq!(rig.puppet.angle(Channel::Torso), Angle::MIN);

    // Short press on the secondary button starts the wave and opens the jaw.
    rig.hold(600, 800, false, true);
    rig.hold(800, 850, false, false);
    assert!(rig.puppet.wave_active());
    assert_eq!(rig.puppet.angle(Channel::Jaw).degrees(), 30);

    rig.hold(850, 900, true, true);
    assert_eq!(rig.puppet.state(), SafetyState::Locked);
    assert!(rig
        .puppet
        .actuators()
        .angles()
        .iter()
        .all(|a| *a == Angle::NEUTRAL));
    assert!(!rig.puppet.wave_active());

    // Chord held inside the cooldown: no further data reaches the puppet.
    rig.hold(900, 1_300, true, true);
    assert_eq!(rig.puppet.angle(Channel::EyeH), Angle::NEUTRAL);
    assert!(rig.controller.is_locked());
}

#[test]
fn test_controller_silence_locks_puppet() {
    let mut rig = Rig::new();
    rig.unlock(0);
    rig.controller.sampler_mut().axes[0] = 4095;
    rig.tick(300);
    assert_eq!(rig.puppet.angle(Channel::EyeH), Angle::MAX);

    // Controller dies. The puppet keeps servicing on its own.
    for ms in (350..=4_300).step_by(50) {
        rig.clock.now.set(ms);
        rig.deliver();
    }
    assert_eq!(rig.puppet.state(), SafetyState::Active);

    rig.clock.now.set(4_301);
    rig.deliver();
    assert_eq!(rig.puppet.state(), SafetyState::Locked);
    assert_eq!(rig.puppet.angle(Channel::EyeH), Angle::NEUTRAL);
    assert_eq!(
        rig.events
            .iter()
            .filter(|e| **e == PuppetEvent::LinkLost)
            .count(),
        1
    );
}

#[test]
fn test_lossy_link_stays_active() {
    let mut rig = Rig::new();
    rig.unlock(0);
    assert_eq!(rig.puppet.state(), SafetyState::Active);

    rig.controller.transport_mut().lose_every = 3;
    rig.hold(300, 10_000, false, false);

    assert_eq!(rig.puppet.state(), SafetyState::Active);
    let stats = rig.puppet.stats();
    assert!(stats.missed > 0);
    assert_eq!(stats.decode_errors, 0);
    assert_eq!(stats.watchdog_expiries, 0);
}

#[test]
fn test_puppet_relocked_by_watchdog_is_rearmed() {
    let mut rig = Rig::new();
    rig.unlock(0);

    // Everything the controller sends is lost for five seconds.
    rig.controller.transport_mut().lose_every = 1;
    rig.hold(300, 5_300, false, false);
    assert_eq!(rig.puppet.state(), SafetyState::Locked);
    assert!(!rig.controller.is_locked());

    rig.controller.transport_mut().lose_every = 0;
    rig.unlock(5_300);
    assert_eq!(rig.puppet.state(), SafetyState::Active);
}
