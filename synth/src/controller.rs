//! # Controller
//!
//! The controller owns the link to the synth, the register cache and the patch
//! name table. Every read and write of a register goes through it, which keeps
//! the cache and the hardware in step.
//!
//! ## Caching
//!
//! ```text
//!  read_parameter(addr, use_cache)           write_parameter(addr, v)
//!        │                                          │
//!        ├─ cached + trusted? ──► cache             ├─ same as cache? ──► done, no I/O
//!        │                                          │
//!        └─ else, if connected:                     ├─ cache[addr] = v
//!              'g' addr ──► value ──► cache         │
//!                                                   └─ if connected and trusted:
//!                                                         's' addr v
//! ```
//!
//! The cache becomes trusted after the first full dump (`'d'`). Until then
//! single reads go to the hardware and single writes stay local.
//!
//! ## Offline mode
//!
//! Without a transport every operation still succeeds: slot, name and cache
//! state are updated and hardware I/O is skipped. A link that dies after
//! startup is not detected; the next exchange fails (or stalls, when no
//! response timeout is configured).

use std::io;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{Observer, SynthEvent};
use crate::parameter::{OPERATOR_COUNT, Parameter, REGISTER_COUNT};
use crate::patch_names::{FilePatchNameStore, PatchNameStore, PatchNames, UNTITLED};
use crate::protocol::{Command, MAX_SLOT, clamp_slot};
use crate::registers::RegisterCache;
use crate::snapshot::PatchSnapshot;
use crate::transport::{SerialTransport, Transport};

pub struct Controller<T: Transport> {
    transport: Option<T>,
    cache: RegisterCache,
    patch_slot: u8,
    /// Name of the working patch, committed to `names` on store.
    patch_name: String,
    names: PatchNames,
    name_store: Box<dyn PatchNameStore>,
    observers: Vec<Box<dyn Observer>>,
}

impl Controller<SerialTransport> {
    /// Opens the configured serial port and reads patch slot 0.
    ///
    /// A port that can't be opened is not an error: the controller comes up
    /// offline.
    pub fn connect(config: &Config) -> Result<Self> {
        let transport = match SerialTransport::open(config) {
            Ok(transport) => Some(transport),
            Err(e) => {
                tracing::warn!("cannot open {}: {e}, working offline", config.port);
                None
            }
        };

        let store = FilePatchNameStore::new(&config.patch_names);
        let mut controller = Self::new(transport, Box::new(store))?;
        if controller.is_connected() {
            controller.reload_current_patch()?;
        }
        Ok(controller)
    }

    /// Controller that never touches the serial port.
    pub fn offline(config: &Config) -> Result<Self> {
        let store = FilePatchNameStore::new(&config.patch_names);
        Self::new(None, Box::new(store))
    }
}

impl<T: Transport> Controller<T> {
    /// Loads the patch names. Does no hardware I/O: the cache stays
    /// untrusted until the first dump.
    pub fn new(transport: Option<T>, mut name_store: Box<dyn PatchNameStore>) -> Result<Self> {
        let names = name_store.load()?;

        if transport.is_none() {
            tracing::warn!("synth not connected, edits stay in the local cache");
        }

        Ok(Self {
            transport,
            cache: RegisterCache::new(),
            patch_slot: 0,
            patch_name: names.get(0).to_owned(),
            names,
            name_store,
            observers: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub(crate) fn notify(&mut self, event: SynthEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.cache.is_initialized()
    }

    #[must_use]
    pub const fn patch_slot(&self) -> u8 {
        self.patch_slot
    }

    #[must_use]
    pub fn patch_name(&self) -> &str {
        &self.patch_name
    }

    /// Renames the working patch. The name table only changes on store.
    pub fn set_patch_name(&mut self, name: &str) {
        if self.patch_name != name {
            name.clone_into(&mut self.patch_name);
            self.notify(SynthEvent::PatchChanged {
                slot: self.patch_slot,
            });
        }
    }

    #[must_use]
    pub const fn names(&self) -> &PatchNames {
        &self.names
    }

    #[must_use]
    pub const fn cache(&self) -> &RegisterCache {
        &self.cache
    }

    #[must_use]
    pub const fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub const fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    fn link(&mut self) -> Result<&mut T> {
        self.transport.as_mut().ok_or(Error::NotConnected)
    }

    /// Sends one request. Pending input is dropped first so the next bytes
    /// read belong to this request.
    fn send(&mut self, command: Command) -> Result<()> {
        let frame = command.encode();
        let link = self.link()?;

        tracing::debug!("send {command:?}");
        link.clear_input()?;
        link.write_all(frame.as_bytes())?;
        link.flush()?;
        Ok(())
    }

    /// Fills `buf` from the link, however the bytes are chunked.
    fn receive(&mut self, buf: &mut [u8]) -> Result<()> {
        let expected = buf.len();
        let link = self.link()?;

        let mut received = 0;
        link.fill(buf, &mut received).map_err(|e| match e.kind() {
            io::ErrorKind::TimedOut => Error::Timeout { expected, received },
            io::ErrorKind::UnexpectedEof => Error::LinkClosed { expected, received },
            _ => e.into(),
        })
    }

    /// One request/response turn. The response is exactly
    /// [`Command::response_len`] bytes long (empty for Set-One).
    pub fn exchange(&mut self, command: Command) -> Result<Vec<u8>> {
        self.send(command)?;

        let mut response = vec![0; command.response_len()];
        self.receive(&mut response)?;
        Ok(response)
    }

    /// Sends a command answered by a single status byte and discards it.
    fn command_with_ack(&mut self, command: Command) -> Result<()> {
        let status = self.exchange(command)?;
        tracing::debug!("{command:?} status {status:02x?}");
        Ok(())
    }

    /// Reads the whole working buffer into the cache. No-op when offline.
    pub fn read_patch_buffer(&mut self) -> Result<()> {
        if !self.is_connected() {
            return Ok(());
        }

        let response = self.exchange(Command::DumpRead)?;
        let image = <&[u8; REGISTER_COUNT]>::try_from(response.as_slice()).map_err(|_| {
            Error::Timeout {
                expected: REGISTER_COUNT,
                received: response.len(),
            }
        })?;
        self.cache.load_image(image);

        tracing::info!("read patch buffer ({})", self.patch_slot);
        Ok(())
    }

    /// Resets the working buffer to the synth's default patch.
    pub fn initialize_working_patch(&mut self) -> Result<()> {
        if self.is_connected() {
            self.command_with_ack(Command::Init)?;
            self.read_patch_buffer()?;
        }

        UNTITLED.clone_into(&mut self.patch_name);
        self.notify(SynthEvent::PatchChanged {
            slot: self.patch_slot,
        });
        Ok(())
    }

    fn recall(&mut self, slot: u8) -> Result<()> {
        if self.is_connected() {
            self.command_with_ack(Command::Recall(slot))?;
            self.read_patch_buffer()?;
        }
        Ok(())
    }

    /// Moves to another patch slot. Selecting the current slot does nothing;
    /// anything outside 0..=127 is clamped.
    pub fn select_patch(&mut self, slot: i32) -> Result<()> {
        if slot == i32::from(self.patch_slot) {
            return Ok(());
        }

        let slot = clamp_slot(slot);
        self.patch_slot = slot;
        self.names.get(slot).clone_into(&mut self.patch_name);

        self.recall(slot)?;

        self.notify(SynthEvent::PatchChanged { slot });
        Ok(())
    }

    /// Recalls the current slot again, dropping unsaved edits.
    pub fn reload_current_patch(&mut self) -> Result<()> {
        let slot = self.patch_slot;
        self.names.get(slot).clone_into(&mut self.patch_name);

        self.recall(slot)?;

        self.notify(SynthEvent::PatchChanged { slot });
        Ok(())
    }

    /// Stores the working buffer into the current slot, or into `to_slot`
    /// which then becomes the current slot. The working name is committed to
    /// the name table either way, even offline.
    pub fn store_patch(&mut self, to_slot: Option<i32>) -> Result<()> {
        if let Some(slot) = to_slot {
            if !(0..=i32::from(MAX_SLOT)).contains(&slot) {
                return Err(Error::SlotOutOfRange(slot));
            }
            self.patch_slot = clamp_slot(slot);
        }

        let slot = self.patch_slot;
        if self.is_connected() {
            self.command_with_ack(Command::Store(slot))?;
        }

        self.names.set(slot, &self.patch_name);
        self.name_store.save(&self.names)?;

        // the synth may normalise values on store
        self.read_patch_buffer()?;

        tracing::info!("stored patch {slot} as {:?}", self.patch_name);
        if to_slot.is_some() {
            self.notify(SynthEvent::PatchChanged { slot });
        }
        Ok(())
    }

    /// Reads one register, from the cache when `use_cache` is set and the
    /// cache is trusted, from the hardware otherwise.
    pub fn read_parameter(&mut self, address: u16, use_cache: bool) -> Result<u8> {
        let cached = self.cache.get(address)?;

        if (use_cache && self.cache.is_initialized()) || !self.is_connected() {
            return Ok(cached);
        }

        let response = self.exchange(Command::GetOne(address))?;
        let value = response[0];
        self.cache.set(address, value)?;

        if value != cached {
            self.notify(SynthEvent::ParameterChanged(address));
        }
        Ok(value)
    }

    /// Writes one register through the cache. Writing the value already
    /// cached does nothing at all. Returns whether the value changed.
    pub fn write_parameter(&mut self, address: u16, value: u8) -> Result<bool> {
        if self.cache.get(address)? == value {
            return Ok(false);
        }

        self.cache.set(address, value)?;

        if self.is_connected() && self.cache.is_initialized() {
            self.exchange(Command::SetOne(address, value))?;
        }

        self.notify(SynthEvent::ParameterChanged(address));
        Ok(true)
    }

    /// Raw register value of a named parameter.
    pub fn parameter(&mut self, parameter: impl Into<Parameter>) -> Result<u8> {
        self.read_parameter(address_of(parameter.into())?, true)
    }

    pub fn set_parameter(&mut self, parameter: impl Into<Parameter>, value: u8) -> Result<bool> {
        self.write_parameter(address_of(parameter.into())?, value)
    }

    /// Value as presented to users: rates and delays are stored inverted
    /// (`255 - v`) and are flipped back here.
    pub fn value(&mut self, parameter: impl Into<Parameter>) -> Result<u8> {
        let parameter = parameter.into();
        let raw = self.parameter(parameter)?;
        Ok(to_user(parameter, raw))
    }

    pub fn set_value(&mut self, parameter: impl Into<Parameter>, value: u8) -> Result<bool> {
        let parameter = parameter.into();
        self.set_parameter(parameter, to_user(parameter, value))
    }

    #[must_use]
    pub fn snapshot(&self) -> PatchSnapshot {
        PatchSnapshot {
            slot: self.patch_slot,
            name: self.patch_name.clone(),
            registers: self.cache.clone(),
        }
    }

    /// Replays a snapshot into the working buffer. Only registers that
    /// differ are written. Returns how many changed.
    pub fn restore(&mut self, snapshot: &PatchSnapshot) -> Result<usize> {
        let mut changed = 0;
        for (address, &value) in (0_u16..).zip(snapshot.registers.image().iter()) {
            if self.write_parameter(address, value)? {
                changed += 1;
            }
        }

        self.set_patch_name(&snapshot.name);
        tracing::info!("restored {changed} registers from snapshot of slot {}", snapshot.slot);
        Ok(changed)
    }
}

fn address_of(parameter: Parameter) -> Result<u16> {
    match parameter {
        Parameter::Operator(op, _) if op >= OPERATOR_COUNT => Err(Error::OperatorOutOfRange(op)),
        _ => Ok(parameter.address()),
    }
}

/// The rate inversion is its own inverse, so one function serves both ways.
const fn to_user(parameter: Parameter, value: u8) -> u8 {
    if parameter.is_rate() { 255 - value } else { value }
}
