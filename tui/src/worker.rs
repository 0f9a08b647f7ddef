use anyhow::{Context, Result};
use htheatpump::{
    DEFAULT_LOGIN_RETRIES, Error, FaultEntry, HeatPump,
    params::{Access, DataType, DpType, Param, Value},
    serial::Port,
};
use log::{debug, warn};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task,
    time::{self, Duration},
};

// Delay between login attempts
const LOGIN_INTERVAL: Duration = Duration::from_secs(4);

// Number of most recent fault list entries to show
const MAX_FAULTS: u32 = 16;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Group {
    Temperatures,
    Operation,
    Settings,
    Faults,
}

#[derive(Debug)]
pub enum Request {
    Query(Group),
    SetParam(String, Value),
}

#[derive(Debug)]
pub enum Response {
    Connected {
        serial_number: u32,
        version: String,
        settings: Vec<Param>,
        tx: UnboundedSender<Request>,
    },
    Disconnected,
    ParamsQueried(Group, Vec<(Param, Value)>),
    FaultsQueried(Vec<FaultEntry>),
    ParamSet(String, Value),
    ParamRejected(String, String),
}

pub struct Worker<'a> {
    hp: &'a mut HeatPump<Port>,
    tx: &'a UnboundedSender<Response>,
}

impl Worker<'_> {
    pub fn start(port: Port, update_limits: bool) -> UnboundedReceiver<Response> {
        let (tx, rx) = mpsc::unbounded_channel();

        task::spawn_local(async move {
            let mut hp = HeatPump::new(port);

            loop {
                match hp.login(DEFAULT_LOGIN_RETRIES).await {
                    Ok(()) => {
                        let mut worker = Worker { hp: &mut hp, tx: &tx };

                        if let Err(err) = worker.run(update_limits).await {
                            debug!("Error running heat pump worker: {err:#}");
                        }
                    }
                    Err(err) => debug!("Error logging in to heat pump: {err}"),
                }

                time::sleep(LOGIN_INTERVAL).await;
            }
        });

        rx
    }

    async fn run(&mut self, update_limits: bool) -> Result<()> {
        let (hp_tx, mut hp_rx) = mpsc::unbounded_channel();

        if update_limits {
            self.hp
                .update_param_limits()
                .await
                .context("Failed to update parameter limits")?;
        }

        let serial_number = self.hp.get_serial_number().await?;
        let (version, revision) = self.hp.get_version().await?;
        let settings = self
            .hp
            .params()
            .iter()
            .filter(|param| param.access() == Access::ReadWrite)
            .cloned()
            .collect();

        self.tx.send(Response::Connected {
            serial_number,
            version: format!("{version} ({revision})"),
            settings,
            tx: hp_tx,
        })?;

        // Handle incoming requests from session channel
        while let Some(req) = hp_rx.recv().await {
            let res = match req {
                Request::Query(Group::Faults) => self
                    .query_faults()
                    .await
                    .context("Failed to query fault list"),
                Request::Query(group) => self
                    .query_params(group)
                    .await
                    .context("Failed to query parameters"),
                Request::SetParam(name, val) => self
                    .set_param(name, val)
                    .await
                    .context("Failed to set parameter"),
            };

            if res.is_err() {
                self.tx.send(Response::Disconnected)?;

                return res;
            }
        }

        Ok(())
    }

    async fn query_params(&mut self, group: Group) -> Result<()> {
        let params: Vec<Param> = self
            .hp
            .params()
            .iter()
            .filter(|param| match group {
                Group::Temperatures => {
                    param.dp_type() == DpType::Measurement
                        && param.data_type() == DataType::Float
                }
                Group::Operation => {
                    param.dp_type() == DpType::Measurement
                        && param.data_type() != DataType::Float
                }
                Group::Settings => param.dp_type() == DpType::Setting,
                Group::Faults => false,
            })
            .cloned()
            .collect();
        let names: Vec<&str> = params.iter().map(Param::name).collect();

        // Settings can't be queried in bulk
        let mut values = if group == Group::Settings {
            self.hp.query(&names).await?
        } else {
            self.hp.fast_query(&names).await?
        };
        let data = params
            .into_iter()
            .filter_map(|param| {
                let val = values.remove(param.name())?;

                Some((param, val))
            })
            .collect();

        self.tx.send(Response::ParamsQueried(group, data))?;

        Ok(())
    }

    async fn query_faults(&mut self) -> Result<()> {
        let size = self.hp.get_fault_list_size().await?;
        let indices: Vec<u32> = (size.saturating_sub(MAX_FAULTS)..size).rev().collect();
        let faults = if indices.is_empty() {
            Vec::new()
        } else {
            self.hp.get_fault_list(&indices).await?
        };

        self.tx.send(Response::FaultsQueried(faults))?;

        Ok(())
    }

    async fn set_param(&mut self, name: String, val: Value) -> Result<()> {
        match self.hp.set_param(&name, val, false).await {
            Ok(val) => self.tx.send(Response::ParamSet(name, val))?,
            Err(
                err @ (Error::OutOfRange { .. } | Error::InvalidValue(_) | Error::Verification(_)),
            ) => {
                warn!("Rejected value {val} for {name:?}: {err}");
                self.tx.send(Response::ParamRejected(name, err.to_string()))?;
            }
            Err(err) => return Err(err.into()),
        }

        Ok(())
    }
}
