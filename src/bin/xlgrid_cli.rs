//! CLI tool for xlgrid - replays grid actions against a workbook
//!
//! Usage:
//!   xlgrid_cli <actions.json>                       # Start from an empty workbook
//!   xlgrid_cli <actions.json> -m model.json         # Start from a saved workbook
//!   xlgrid_cli <actions.json> -o out.json           # Write the result to a file
//!
//! The actions file holds a JSON array of `GridAction` objects, e.g.
//! `[{"type": "startEditing", "text": "1"}, {"type": "commitEditing", "direction": "down"}]`.
//! The output is the final state, the workbook and any failed actions.

#![allow(clippy::exit)]

use std::env;
use std::fs;
use std::io::{self, Write};

use serde::Serialize;
use xlgrid::{CalcModel, GridAction, GridConfig, GridState, GridWidget, MemoryModel};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Failure {
    index: usize,
    action: GridAction,
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Replay {
    state: GridState,
    model: serde_json::Value,
    failures: Vec<Failure>,
    undo_depth: usize,
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn read(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => fail(&format!("Error reading {path}: {e}")),
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let Some(actions_path) = args.get(1) else {
        fail("Usage: xlgrid_cli <actions.json> [-m model.json] [-o output.json]");
    };
    let option = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
    };

    let model = match option("-m") {
        Some(path) => match MemoryModel::from_json(&read(path)) {
            Ok(model) => model,
            Err(e) => fail(&format!("Error loading {path}: {e}")),
        },
        None => MemoryModel::new(),
    };
    let actions: Vec<GridAction> = match serde_json::from_str(&read(actions_path)) {
        Ok(actions) => actions,
        Err(e) => fail(&format!("Error parsing {actions_path}: {e}")),
    };

    let mut widget = GridWidget::with_model(model, GridConfig::default(), 1024.0, 768.0);
    let mut failures = Vec::new();
    for (index, action) in actions.into_iter().enumerate() {
        widget.dispatch(&action);
        if let Some(error) = widget.last_error() {
            failures.push(Failure {
                index,
                error: error.to_string(),
                action,
            });
        }
    }

    let Some(user_model) = widget.model() else {
        fail("Widget lost its model");
    };
    let model = match user_model
        .model()
        .to_json()
        .and_then(|json| Ok(serde_json::from_str::<serde_json::Value>(&json)?))
    {
        Ok(value) => value,
        Err(e) => fail(&format!("Error serializing workbook: {e}")),
    };
    let replay = Replay {
        state: widget.state().clone(),
        model,
        failures,
        undo_depth: user_model.history().undo_len(),
    };
    let json = match serde_json::to_string_pretty(&replay) {
        Ok(j) => j,
        Err(e) => fail(&format!("Error serializing JSON: {e}")),
    };

    match option("-o") {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                fail(&format!("Error writing {path}: {e}"));
            }
            eprintln!("Written: {path}");
        }
        None => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{json}") {
                fail(&format!("Error writing output: {e}"));
            }
        }
    }
}
