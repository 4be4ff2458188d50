//! WebAssembly Edge Workers for BitCraps
//!
//! This module provides WebAssembly runtime support for edge workers,
//! enabling custom logic execution at the network edge with sandboxed
//! security and high performance.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// WebAssembly worker runtime (placeholder for now)
#[derive(Debug, Clone)]
pub struct WasmWorkerRuntime {
    pub workers: HashMap<Uuid, WasmWorker>,
}

/// WebAssembly worker definition
#[derive(Debug, Clone)]
pub struct WasmWorker {
    pub id: Uuid,
    pub name: String,
    pub code: Vec<u8>,
    pub memory_limit: usize,
    pub execution_time_limit: Duration,
}

impl WasmWorkerRuntime {
    /// Create new WASM worker runtime
    pub fn new() -> Self {
        Self {
            workers: HashMap::new(),
        }
    }

    /// Deploy a new worker
    pub async fn deploy_worker(&mut self, worker: WasmWorker) -> Result<()> {
        self.workers.insert(worker.id, worker);
        Ok(())
    }

    /// Execute worker with input
    pub async fn execute_worker(&self, worker_id: Uuid, input: &[u8]) -> Result<Vec<u8>> {
        if let Some(_worker) = self.workers.get(&worker_id) {
            // TODO: Implement actual WASM execution
            Ok(input.to_vec())
        } else {
            Err(Error::NotFound(format!("Worker {} not found", worker_id)))
        }
    }
}