//! Headless replay of grid edit scripts.
//!
//! Usage: sgrid replay script.json [--preset pdus] [--config settings.json]
//!
//! A script is a JSON object:
//!
//! ```json
//! {
//!   "form": "pdus",
//!   "debounce_ms": 50,
//!   "initial": [{"id": 1, "make": "APC"}],
//!   "steps": [
//!     {"op": "set_field", "index": 0, "key": "make", "value": "Eltek"},
//!     {"op": "wait", "ms": 100},
//!     {"op": "remove", "id": 1},
//!     {"op": "dispose"}
//!   ]
//! }
//! ```
//!
//! Grid operations run against a live `EntityGrid` on a smol executor with
//! real timers, so debouncing behaves exactly as it would in a host. Every
//! flush is saved to an in-memory store and reported as an event.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol::{LocalExecutor, Timer};
use surveygrid_config::{FormCatalog, GridSettings};
use surveygrid_engine::{EntityCollection, EntityRecord, FieldSchema, GridOp, GridOptions};
use surveygrid_sync::{persist_to, EntityGrid, EntityStore, MemoryEntityStore};

use crate::exit_codes::{EXIT_IO, EXIT_PARSE, EXIT_USAGE};
use crate::CliError;

/// Form name used when the script declares its own field keys.
pub const INLINE_FORM: &str = "inline";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub form: Option<String>,
    /// Inline field keys, used when no preset is named.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    /// Replaces the preset/settings options wholesale.
    #[serde(default)]
    pub options: Option<GridOptions>,
    #[serde(default)]
    pub debounce_ms: Option<u64>,
    /// Pause after every grid operation.
    #[serde(default)]
    pub step_delay_ms: u64,
    #[serde(default)]
    pub initial: Vec<EntityRecord>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Replay-only steps that drive time and lifecycle rather than data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Control {
    Wait { ms: u64 },
    Dispose,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Control(Control),
    Op(GridOp),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    Flush {
        seq: u64,
        at: DateTime<Utc>,
        entities: Vec<EntityRecord>,
    },
    Rejected {
        step: usize,
        op: String,
        code: String,
        message: String,
    },
    Final {
        form: String,
        revision: u64,
        flushes: u64,
        disposed: bool,
        entities: Vec<EntityRecord>,
        saved: Vec<EntityRecord>,
    },
}

/// Resolved grid shape for one replay.
#[derive(Debug, Clone)]
pub struct GridSetup {
    pub form: String,
    pub schema: FieldSchema,
    pub options: GridOptions,
    pub debounce: Duration,
}

#[derive(Debug)]
pub struct ReplayOutcome {
    pub events: Vec<ReplayEvent>,
    pub rejected: usize,
}

pub fn load_script(path: &Path) -> Result<Script, CliError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents).map_err(|e| {
        CliError::new(EXIT_PARSE, format!("invalid script {}: {}", path.display(), e))
    })
}

/// Pick the schema and options: `--preset`, then the script's `form`, then
/// its inline `fields`.
pub fn setup(
    script: &Script,
    preset: Option<&str>,
    settings: &GridSettings,
    catalog: &FormCatalog,
) -> Result<GridSetup, CliError> {
    let debounce = script
        .debounce_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.debounce());

    let (form, schema, options) = match (preset.or(script.form.as_deref()), &script.fields) {
        (Some(name), _) => {
            let resolved = catalog.resolve(name, settings)?;
            (resolved.name, resolved.schema, resolved.options)
        }
        (None, Some(fields)) => {
            let schema = FieldSchema::new(fields.iter().cloned()).map_err(|e| {
                CliError::new(EXIT_USAGE, format!("invalid inline fields: {}", e))
            })?;
            (INLINE_FORM.to_string(), schema, settings.to_options())
        }
        (None, None) => {
            return Err(CliError::new(EXIT_USAGE, "script names no form")
                .with_hint("pass --preset NAME, or add \"form\" or \"fields\" to the script"));
        }
    };

    Ok(GridSetup {
        form,
        schema,
        options: script.options.unwrap_or(options),
        debounce,
    })
}

/// Run the script to completion.
///
/// With `drain`, the replay waits out a pending flush after the last step;
/// without it the grid is disposed immediately, dropping that flush.
pub fn run(script: Script, setup: GridSetup, drain: bool) -> ReplayOutcome {
    let ex = Rc::new(LocalExecutor::new());
    let events: Rc<RefCell<Vec<ReplayEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let store = Rc::new(RefCell::new(MemoryEntityStore::new()));

    let sink = events.clone();
    let mut save = persist_to(store.clone(), setup.form.clone());
    let mut seq = 0;
    let on_change = move |records: Vec<EntityRecord>| {
        seq += 1;
        sink.borrow_mut().push(ReplayEvent::Flush {
            seq,
            at: Utc::now(),
            entities: records.clone(),
        });
        save(records);
    };

    let Script {
        initial,
        steps,
        step_delay_ms,
        ..
    } = script;
    let GridSetup {
        form,
        schema,
        options,
        debounce,
    } = setup;

    let collection = EntityCollection::new(schema, options, initial);
    let grid = EntityGrid::new(collection, debounce, ex.clone(), on_change);
    let step_delay = Duration::from_millis(step_delay_ms);
    let mut rejected = 0;

    smol::block_on(ex.run(async {
        for (index, step) in steps.iter().enumerate() {
            match step {
                Step::Control(Control::Wait { ms }) => {
                    Timer::after(Duration::from_millis(*ms)).await;
                }
                Step::Control(Control::Dispose) => grid.dispose(),
                Step::Op(op) => {
                    if let Err(e) = grid.apply(op) {
                        rejected += 1;
                        events.borrow_mut().push(ReplayEvent::Rejected {
                            step: index,
                            op: op.name().to_string(),
                            code: e.code().to_string(),
                            message: e.to_string(),
                        });
                    }
                    if !step_delay.is_zero() {
                        Timer::after(step_delay).await;
                    }
                }
            }
        }

        if drain {
            while grid.is_flush_pending() {
                Timer::after(debounce).await;
            }
        }
    }));

    if !grid.is_disposed() {
        grid.dispose();
    }

    let (revision, entities) = grid.with_collection(|c| (c.revision(), c.records()));
    let saved = store.borrow().load(&form).unwrap_or_default();
    events.borrow_mut().push(ReplayEvent::Final {
        form,
        revision,
        flushes: grid.flushes(),
        disposed: true,
        entities,
        saved,
    });

    let events = std::mem::take(&mut *events.borrow_mut());
    ReplayOutcome { events, rejected }
}
