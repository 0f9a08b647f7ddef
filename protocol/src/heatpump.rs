//! Heat pump client.

use crate::{
    Connection, Error, Result,
    datetime::DateTime,
    frame::{self, MAX_CMD_LENGTH, RESPONSE_HEADER_LEN, ResponseHeader},
    params::{DpType, Param, Registry, Value},
    response,
    timeprog::{TimeProgEntry, TimeProgPeriod, TimeProgram},
};
use alloc::{
    borrow::ToOwned,
    collections::btree_map::BTreeMap,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};
use bitflags_derive::{FlagsDebug, FlagsDisplay, FlagsFromStr};
use core::fmt::Display;
use embedded_io_async::{Read, Write};
use log::{debug, error, info, trace, warn};

/// Default number of login retries.
pub const DEFAULT_LOGIN_RETRIES: usize = 2;

/// Upper bound for payloads of unknown length.
const MAX_PAYLOAD_LEN: usize = 255;

/// Minimum limits reported by some firmware versions that deviate
/// from the catalog: (parameter name, reported minimum, catalog minimum).
const MIN_LIMIT_QUIRKS: &[(&str, Value, Value)] =
    &[("Verdichter laeuft seit", Value::Int(10), Value::Int(0))];

bitflags::bitflags! {
    /// Parts of a parameter response that are verified against the registry.
    ///
    /// Defaults to [`VerifyAction::Name`].
    #[derive(FlagsDisplay, FlagsFromStr, FlagsDebug, PartialEq, Eq, Copy, Clone)]
    pub struct VerifyAction: u8 {
        /// Parameter name.
        const Name = 0x01;
        /// Lower limit.
        const Min = 0x02;
        /// Upper limit.
        const Max = 0x04;
        /// Value within limits.
        const Value = 0x08;
    }
}

impl Default for VerifyAction {
    fn default() -> Self {
        Self::Name
    }
}

/// An entry of the fault list.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct FaultEntry {
    /// Index within the fault list.
    pub index: u32,
    /// Error code.
    pub error: u32,
    /// Time of occurrence.
    pub datetime: DateTime,
    /// Error message, e.g. `EQ_Spreizung`.
    pub message: String,
}

/// Parameter data contained in a response.
#[derive(Debug)]
struct ParamData {
    name: String,
    value: Value,
    min: Value,
    max: Value,
}

/// Asynchronous heat pump client.
///
/// Requires a port that implements [`Read`] and [`Write`] for communication.
/// Logging in additionally requires the port to implement [`Connection`].
///
/// All operations take `&mut self`, so only a single request/response
/// exchange can be in flight at any time. Share a client between tasks
/// by wrapping it in an async mutex.
///
/// # Examples
///
/// ```no_run
/// use htheatpump::{Connection, HeatPump, VerifyAction, embedded_io_async::{Read, Write}};
/// use htheatpump::params::Value;
///
/// async fn example<P: Read + Write + Connection>(port: P) -> htheatpump::Result<(), P::Error> {
///     let mut hp = HeatPump::new(port);
///
///     hp.set_verify_action(VerifyAction::all());
///     hp.login(3).await?;
///
///     let temp = hp.set_param("HKR Soll_Raum", Value::Float(21.5), false).await?;
///
///     println!("Room temperature set to {temp}");
///
///     hp.logout().await;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct HeatPump<P> {
    port: P,
    params: Registry,
    verify: VerifyAction,
    verify_error: bool,
}

impl<P: Read + Write> HeatPump<P> {
    /// Constructs a new client using the built-in parameter catalog.
    pub fn new(port: P) -> Self {
        Self::with_registry(port, Registry::new())
    }

    /// Constructs a new client using the given parameter registry.
    pub fn with_registry(port: P, params: Registry) -> Self {
        Self {
            port,
            params,
            verify: VerifyAction::default(),
            verify_error: false,
        }
    }

    /// Returns the parameter registry.
    pub fn params(&self) -> &Registry {
        &self.params
    }

    /// Returns the parts of parameter responses that are verified.
    pub fn verify_action(&self) -> VerifyAction {
        self.verify
    }

    /// Sets the parts of parameter responses that are verified.
    pub fn set_verify_action(&mut self, verify: VerifyAction) {
        self.verify = verify;
    }

    /// Returns whether verification failures are reported as errors.
    pub fn verify_error(&self) -> bool {
        self.verify_error
    }

    /// Sets whether verification failures are reported as errors.
    ///
    /// If disabled, failures are only logged as warnings.
    pub fn set_verify_error(&mut self, verify_error: bool) {
        self.verify_error = verify_error;
    }

    /// Consumes the client, returning the port.
    pub fn into_inner(self) -> P {
        self.port
    }

    /// Sends a raw request to the heat pump.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLength`] if the command is too long
    pub async fn send_request(&mut self, cmd: &str) -> Result<(), P::Error> {
        let req = frame::build_request(cmd)?;

        debug!("Send request: {cmd:?}");
        self.write(&req).await
    }

    /// Reads a raw response from the heat pump.
    ///
    /// Returns the response text without the frame and envelope.
    ///
    /// # Errors
    ///
    /// - [`Error::StreamBroken`] if the port returns fewer bytes than expected
    /// - [`Error::UnknownHeader`] if the response header is unknown
    /// - [`Error::IncorrectChecksum`] if the checksum doesn't match
    /// - [`Error::InvalidPayload`] if the payload is malformed
    pub async fn read_response(&mut self) -> Result<String, P::Error> {
        let mut header = [0x00; RESPONSE_HEADER_LEN];
        let mut len = [0x00];

        self.read(&mut header).await?;

        let kind = ResponseHeader::from_bytes(&header).ok_or(Error::UnknownHeader(header))?;

        self.read(&mut len).await?;

        let payload = if len[0] == 0 {
            // Some answers (e.g. to fast queries) declare a length of zero
            debug!("Response with zero length, reading until end of payload");
            self.read_unknown_length().await?
        } else {
            let mut payload = vec![0x00; len[0].into()];

            self.read(&mut payload).await?;

            payload
        };

        let payload_len = u8::try_from(payload.len()).map_err(|_| Error::InvalidPayload)?;
        let expected = kind.checksum(kind.correct_length(payload_len), &payload);
        let mut checksum = [0x00];

        self.read(&mut checksum).await?;

        if checksum[0] != expected {
            return Err(Error::IncorrectChecksum {
                expected,
                actual: checksum[0],
            });
        }

        let resp = frame::extract_data(&payload).ok_or(Error::InvalidPayload)?;

        debug!("Received response: {resp:?}");

        Ok(resp.to_owned())
    }

    /// Logs out from the heat pump.
    ///
    /// Failures are only logged.
    pub async fn logout(&mut self) {
        match self.request("LOUT").await {
            Ok(resp) if resp.starts_with("OK") => info!("Logout successful"),
            Ok(resp) => warn!("Logout failed, invalid response: {resp:?}"),
            Err(err) => warn!("Logout failed: {err:?}"),
        }
    }

    /// Queries the serial number of the heat pump.
    pub async fn get_serial_number(&mut self) -> Result<u32, P::Error> {
        let resp = self.request("RID").await?;
        let rid = response::serial_number(&resp).ok_or(Error::InvalidResponse(resp))?;

        debug!("Serial number: {rid}");

        Ok(rid)
    }

    /// Queries the software version of the heat pump.
    ///
    /// Returns the version string (e.g. `3.0.20`) and revision.
    pub async fn get_version(&mut self) -> Result<(String, u32), P::Error> {
        let resp = self.request("SP,NR=9").await?;
        let version = response::version(&resp)
            .and_then(|(name, rev)| Some((name.to_owned(), rev.parse::<u32>().ok()?)));
        let (name, rev) = version.ok_or(Error::InvalidResponse(resp))?;

        debug!("Software version: {name} ({rev})");

        Ok((name, rev))
    }

    /// Queries the current date and time of the heat pump.
    ///
    /// Returns the date and time together with the weekday (1 = Monday).
    pub async fn get_date_time(&mut self) -> Result<(DateTime, u8), P::Error> {
        let resp = self.request("CLK").await?;

        Self::parse_clock(resp)
    }

    /// Sets the date and time of the heat pump.
    ///
    /// Returns the date and time reported back by the heat pump.
    pub async fn set_date_time(&mut self, dt: DateTime) -> Result<(DateTime, u8), P::Error> {
        let cmd = format!(
            "CLK,DA={},TI={},WD={}",
            dt.device_date(),
            dt.device_time(),
            dt.weekday()
        );
        let resp = self.request(&cmd).await?;

        Self::parse_clock(resp)
    }

    /// Queries the most recent fault list entry.
    pub async fn get_last_fault(&mut self) -> Result<FaultEntry, P::Error> {
        let resp = self.request("ALC").await?;

        Self::parse_fault(resp)
    }

    /// Queries the number of fault list entries.
    pub async fn get_fault_list_size(&mut self) -> Result<u32, P::Error> {
        let resp = self.request("ALS").await?;
        let size = response::sum(&resp).ok_or(Error::InvalidResponse(resp))?;

        debug!("Fault list size: {size}");

        Ok(size)
    }

    /// Queries the given fault list entries.
    ///
    /// Queries all entries if `indices` is empty.
    /// Multiple entries are requested at once to speed up the query.
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedIndex`] if the heat pump returns entries out of order
    pub async fn get_fault_list(&mut self, indices: &[u32]) -> Result<Vec<FaultEntry>, P::Error> {
        let all: Vec<u32>;
        let indices = if indices.is_empty() {
            all = (0..self.get_fault_list_size().await?).collect();
            &all
        } else {
            indices
        };
        let mut faults = Vec::with_capacity(indices.len());

        for (cmd, batch) in batches("AR", indices) {
            self.send_request(&cmd).await?;

            for &expected in batch {
                let resp = self.read_response().await?;
                let fault = Self::parse_fault(resp)?;

                if fault.index != expected {
                    return Err(Error::UnexpectedIndex {
                        expected,
                        actual: fault.index,
                    });
                }

                faults.push(fault);
            }
        }

        Ok(faults)
    }

    /// Returns whether the heat pump is in an error state.
    pub async fn in_error(&mut self) -> Result<bool, P::Error> {
        let val = self.get_param("Stoerung").await?;

        val.as_bool()
            .ok_or_else(|| Error::InvalidResponse(val.to_string()))
    }

    /// Queries the value of a parameter.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownParameter`] if the parameter isn't part of the registry
    /// - [`Error::Verification`] if verification fails and verification errors are enabled
    pub async fn get_param(&mut self, name: &str) -> Result<Value, P::Error> {
        let param = self.lookup(name)?;
        let resp = self.request(&param.cmd()).await?;
        let data = Self::parse_param(&param, resp)?;

        self.verify_param(&param, &data, self.verify)?;
        debug!("{name:?}: {}", data.value);

        Ok(data.value)
    }

    /// Sets the value of a parameter.
    ///
    /// Returns the value reported back by the heat pump.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownParameter`] if the parameter isn't part of the registry
    /// - [`Error::InvalidValue`] if the value doesn't match the parameter's data type
    /// - [`Error::OutOfRange`] if the value lies outside of the limits and `ignore_limits` isn't set
    pub async fn set_param(
        &mut self,
        name: &str,
        value: Value,
        ignore_limits: bool,
    ) -> Result<Value, P::Error> {
        let param = self.lookup(name)?;
        let value = param.coerce(value)?;

        if !ignore_limits && !param.in_limits(&value) {
            return Err(Error::OutOfRange {
                name: name.to_owned(),
                value,
            });
        }

        let cmd = format!("{},VAL={}", param.cmd(), param.format(value)?);
        let resp = self.request(&cmd).await?;
        let data = Self::parse_param(&param, resp)?;

        self.verify_param(&param, &data, self.verify)?;
        info!("{name:?} set to {}", data.value);

        Ok(data.value)
    }

    /// Queries the values of multiple parameters one after another.
    ///
    /// Queries all parameters if `names` is empty.
    pub async fn query(&mut self, names: &[&str]) -> Result<BTreeMap<String, Value>, P::Error> {
        let names: Vec<String> = if names.is_empty() {
            self.params.names().map(ToOwned::to_owned).collect()
        } else {
            names.iter().map(|&name| name.to_owned()).collect()
        };
        let mut values = BTreeMap::new();

        for name in names {
            let val = self.get_param(&name).await?;

            values.insert(name, val);
        }

        Ok(values)
    }

    /// Queries the values of multiple measured values at once.
    ///
    /// Queries all measured values if `names` is empty.
    /// Values are requested in bulk, which is much faster than [`HeatPump::query`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameterType`] if a parameter isn't a measured value
    /// - [`Error::UnexpectedDataPoint`] if the heat pump returns a value that wasn't requested
    pub async fn fast_query(&mut self, names: &[&str]) -> Result<BTreeMap<String, Value>, P::Error> {
        let params: Vec<Param> = if names.is_empty() {
            self.params.of_type(DpType::Measurement).cloned().collect()
        } else {
            names
                .iter()
                .map(|&name| -> Result<Param, P::Error> {
                    let param = self.lookup(name)?;

                    if param.dp_type() != DpType::Measurement {
                        return Err(Error::InvalidParameterType(name.to_owned()));
                    }

                    Ok(param)
                })
                .collect::<Result<_, _>>()?
        };
        let numbers: Vec<u16> = params.iter().map(Param::number).collect();
        let mut values = BTreeMap::new();

        for (cmd, batch) in batches("MR", &numbers) {
            self.send_request(&cmd).await?;

            for _ in batch {
                let resp = self.read_response().await?;
                let (number, val) = match response::data_point(&resp) {
                    Some((number, val)) => (number, val.to_owned()),
                    None => return Err(Error::InvalidResponse(resp)),
                };
                let param = params
                    .iter()
                    .find(|param| param.number() == number)
                    .ok_or(Error::UnexpectedDataPoint(number))?;
                let val = param.parse(&val, true)?;

                if !param.in_limits(&val) {
                    warn!("{:?}: value {val} beyond limits", param.name());
                }

                values.insert(param.name().to_owned(), val);
            }
        }

        Ok(values)
    }

    /// Refreshes the limits of all parameters from the heat pump.
    ///
    /// Returns the names of the parameters whose limits changed.
    pub async fn update_param_limits(&mut self) -> Result<Vec<String>, P::Error> {
        let names: Vec<String> = self.params.names().map(ToOwned::to_owned).collect();
        let mut updated = Vec::new();

        for name in names {
            let param = self.lookup(&name)?;
            let resp = self.request(&param.cmd()).await?;
            let data = Self::parse_param(&param, resp)?;

            self.verify_param(&param, &data, self.verify & VerifyAction::Name)?;

            let changed = self
                .params
                .get_mut(&name)
                .ok_or_else(|| Error::UnknownParameter(name.clone()))?
                .set_limits(Some(data.min), Some(data.max))?;

            if changed {
                info!("Updated limits of {name:?}: [{}, {}]", data.min, data.max);
                updated.push(name);
            }
        }

        Ok(updated)
    }

    /// Queries the headers of all time programs.
    ///
    /// The entries of the returned time programs are empty.
    pub async fn get_time_progs(&mut self) -> Result<Vec<TimeProgram>, P::Error> {
        let resp = self.request("PRL").await?;
        let sum = response::sum(&resp).ok_or(Error::InvalidResponse(resp))?;
        let mut progs = Vec::new();

        for idx in 0..sum {
            let idx = u8::try_from(idx).map_err(|_| Error::InvalidResponse(format!("SUM={sum}")))?;
            let resp = self.read_response().await?;

            progs.push(Self::parse_program(resp, idx)?);
        }

        Ok(progs)
    }

    /// Queries a time program.
    ///
    /// If `with_entries` is set, all entries are queried as well.
    pub async fn get_time_prog(
        &mut self,
        idx: u8,
        with_entries: bool,
    ) -> Result<TimeProgram, P::Error> {
        if !with_entries {
            let resp = self.request(&format!("PRI{idx}")).await?;

            return Self::parse_program(resp, idx);
        }

        // Header followed by one response per entry, day by day
        let resp = self.request(&format!("PRD{idx}")).await?;
        let mut prog = Self::parse_program(resp, idx)?;

        for day in 0..prog.number_of_days().into() {
            for num in 0..prog.entries_a_day().into() {
                let resp = self.read_response().await?;
                let entry = Self::parse_entry(resp, idx, day, num)?;

                prog.set_entry(day, num, Some(entry))?;
            }
        }

        Ok(prog)
    }

    /// Queries a single entry of a time program.
    pub async fn get_time_prog_entry(
        &mut self,
        idx: u8,
        day: usize,
        num: usize,
    ) -> Result<TimeProgEntry, P::Error> {
        let resp = self
            .request(&format!("PRE,PR={idx},DAY={day},EV={num}"))
            .await?;

        Self::parse_entry(resp, idx, day, num)
    }

    /// Sets a single entry of a time program.
    ///
    /// Returns the entry reported back by the heat pump.
    pub async fn set_time_prog_entry(
        &mut self,
        idx: u8,
        day: usize,
        num: usize,
        entry: &TimeProgEntry,
    ) -> Result<TimeProgEntry, P::Error> {
        let cmd = format!(
            "PRE,PR={idx},DAY={day},EV={num},ST={},BEG={},END={}",
            entry.state,
            entry.period.start(),
            entry.period.end()
        );
        let resp = self.request(&cmd).await?;

        Self::parse_entry(resp, idx, day, num)
    }

    /// Writes a time program to the heat pump.
    ///
    /// Present entries are written, absent entries are queried.
    /// Returns the time program with all entries as reported by the heat pump.
    pub async fn set_time_prog(&mut self, prog: &TimeProgram) -> Result<TimeProgram, P::Error> {
        let mut result = prog.clone();

        for day in 0..prog.number_of_days().into() {
            for num in 0..prog.entries_a_day().into() {
                let entry = match prog.entry(day, num)? {
                    Some(entry) => {
                        self.set_time_prog_entry(prog.index(), day, num, &entry)
                            .await?
                    }
                    None => self.get_time_prog_entry(prog.index(), day, num).await?,
                };

                result.set_entry(day, num, Some(entry))?;
            }
        }

        Ok(result)
    }

    fn lookup(&self, name: &str) -> Result<Param, P::Error> {
        self.params
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownParameter(name.to_owned()))
    }

    fn verify_param(
        &self,
        param: &Param,
        data: &ParamData,
        verify: VerifyAction,
    ) -> Result<(), P::Error> {
        let mut failures = Vec::new();

        if verify.contains(VerifyAction::Name) && data.name != param.name() {
            failures.push(format!("name {:?} (expected {:?})", data.name, param.name()));
        }

        // Unknown bounds in the registry match any reported limit
        let min = param.min().filter(|_| verify.contains(VerifyAction::Min));
        let max = param.max().filter(|_| verify.contains(VerifyAction::Max));

        if let Some(min) = min.filter(|&min| min != data.min) {
            let quirk = MIN_LIMIT_QUIRKS.iter().any(|&(name, reported, expected)| {
                name == param.name() && reported == data.min && expected == min
            });

            if quirk {
                debug!("{:?}: ignoring known deviation of minimum {}", param.name(), data.min);
            } else {
                failures.push(format!("min {} (expected {min})", data.min));
            }
        }

        if let Some(max) = max.filter(|&max| max != data.max) {
            failures.push(format!("max {} (expected {max})", data.max));
        }

        if verify.contains(VerifyAction::Value) && !param.in_limits(&data.value) {
            // Only worth a warning, the heat pump reported the value after all
            warn!("{:?}: value {} beyond limits", param.name(), data.value);
        }

        if failures.is_empty() {
            return Ok(());
        }

        let msg = format!("{:?}: {}", param.name(), failures.join(", "));

        if self.verify_error {
            return Err(Error::Verification(msg));
        }

        warn!("Verification failed for {msg}");

        Ok(())
    }

    async fn request(&mut self, cmd: &str) -> Result<String, P::Error> {
        self.send_request(cmd).await?;
        self.read_response().await
    }

    async fn read_unknown_length(&mut self) -> Result<Vec<u8>, P::Error> {
        let mut payload = Vec::new();

        while !payload.ends_with(b"\r\n") {
            if payload.len() >= MAX_PAYLOAD_LEN {
                return Err(Error::InvalidPayload);
            }

            let mut byte = [0x00];

            self.read(&mut byte).await?;
            payload.push(byte[0]);
        }

        Ok(payload)
    }

    fn parse_param(param: &Param, resp: String) -> Result<ParamData, P::Error> {
        let Some(fields) = response::param(&resp, &param.cmd()) else {
            return Err(Error::InvalidResponse(resp));
        };

        Ok(ParamData {
            name: fields.name.to_owned(),
            value: param.parse(fields.value, true)?,
            min: param.parse(fields.min, true)?,
            max: param.parse(fields.max, true)?,
        })
    }

    fn parse_clock(resp: String) -> Result<(DateTime, u8), P::Error> {
        let clock = response::clock(&resp).and_then(|(date, time, weekday)| {
            Some((DateTime::from_device(date, time).ok()?, weekday))
        });

        clock.ok_or(Error::InvalidResponse(resp))
    }

    fn parse_fault(resp: String) -> Result<FaultEntry, P::Error> {
        let fault = response::fault(&resp).and_then(|fields| {
            Some(FaultEntry {
                index: fields.index,
                error: fields.error,
                datetime: DateTime::from_device(fields.date, fields.time).ok()?,
                message: fields.message.to_owned(),
            })
        });

        fault.ok_or(Error::InvalidResponse(resp))
    }

    fn parse_program(resp: String, idx: u8) -> Result<TimeProgram, P::Error> {
        let Some(fields) = response::program(&resp, idx) else {
            return Err(Error::InvalidResponse(resp));
        };

        Ok(TimeProgram::new(
            idx,
            fields.name.to_owned(),
            fields.entries_a_day,
            fields.number_of_states,
            fields.step_size,
            fields.number_of_days,
        ))
    }

    fn parse_entry(resp: String, idx: u8, day: usize, num: usize) -> Result<TimeProgEntry, P::Error> {
        let Some(fields) = response::entry(&resp, idx, day, num) else {
            return Err(Error::InvalidResponse(resp));
        };

        Ok(TimeProgEntry {
            state: fields.state,
            period: TimeProgPeriod::from_strs(fields.begin, fields.end)?,
        })
    }

    /// Reads data from the port into the provided buffer.
    async fn read(&mut self, buf: &mut [u8]) -> Result<(), P::Error> {
        self.port.read_exact(buf).await?;
        trace!("Read from port: {buf:02x?}");

        Ok(())
    }

    /// Writes the provided buffer to the port.
    async fn write(&mut self, buf: &[u8]) -> Result<(), P::Error> {
        trace!("Write to port: {buf:02x?}");
        self.port.write_all(buf).await.map_err(Error::Io)?;
        self.port.flush().await.map_err(Error::Io)
    }
}

impl<P: Read + Write + Connection> HeatPump<P> {
    /// Logs in to the heat pump.
    ///
    /// Failed attempts are retried up to `max_retries` times.
    /// The connection is re-established after every failed attempt.
    ///
    /// # Errors
    ///
    /// - [`Error::LoginFailed`] if all attempts failed
    pub async fn login(&mut self, max_retries: usize) -> Result<(), P::Error> {
        let tries = max_retries + 1;

        for attempt in 1..=tries {
            match self.request("LIN").await {
                Ok(resp) if resp.starts_with("OK") => {
                    info!("Login successful");

                    return Ok(());
                }
                Ok(resp) => warn!("Login attempt {attempt}/{tries} failed: {resp:?}"),
                Err(err) => warn!("Login attempt {attempt}/{tries} failed: {err:?}"),
            }

            self.port.reconnect().await.map_err(Error::Io)?;
        }

        error!("Login failed after {tries} tries");

        Err(Error::LoginFailed(tries))
    }

    /// Logs in to the heat pump and refreshes the parameter limits.
    ///
    /// Returns the names of the parameters whose limits changed.
    pub async fn login_and_update_limits(
        &mut self,
        max_retries: usize,
    ) -> Result<Vec<String>, P::Error> {
        self.login(max_retries).await?;
        self.update_param_limits().await
    }
}

/// Splits items into commands of the form `<prefix>,<item>,<item>...`
/// that don't exceed the maximum command length.
fn batches<'a, T: Display>(prefix: &str, items: &'a [T]) -> Vec<(String, &'a [T])> {
    let mut batches = Vec::new();
    let mut cmd = String::from(prefix);
    let mut start = 0;

    for (idx, item) in items.iter().enumerate() {
        let part = format!(",{item}");

        if idx > start && cmd.len() + part.len() > MAX_CMD_LENGTH {
            batches.push((core::mem::replace(&mut cmd, String::from(prefix)), &items[start..idx]));
            start = idx;
        }

        cmd.push_str(&part);
    }

    if start < items.len() {
        batches.push((cmd, &items[start..]));
    }

    batches
}
