//! WebAssembly runtime implementation
//!
//! This module provides the core WASM runtime functionality including:
//! - Module compilation and instantiation
//! - Execution environment setup
//! - Fuel metering and resource limits
//! - Security sandboxing

use crate::error::{Error, Result};
use crate::wasm::{
    WasmConfig, WasmValue, WasmHostFunctions, WasmMemoryManager, WasmErrorType, WasmExecutionResult,
};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A compiled WASM module
pub struct WasmModule {
    /// Module name
    pub name: String,
    /// Original WASM bytecode
    pub bytecode: Bytes,
    /// Module configuration
    pub config: WasmConfig,
    /// Exported functions
    pub exports: HashMap<String, WasmFunctionSignature>,
    /// Imported functions
    pub imports: HashMap<String, WasmFunctionSignature>,
    /// Module compilation time
    pub compiled_at: Instant,
    /// Module hash for caching
    pub hash: String,
}

/// WASM function signature
#[derive(Debug, Clone)]
pub struct WasmFunctionSignature {
    pub name: String,
    pub parameters: Vec<WasmValueType>,
    pub returns: Vec<WasmValueType>,
}

/// WASM value types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WasmValueType {
    I32,
    I64,
    F32,
    F64,
}

impl WasmModule {
    /// Create a new WASM module
    pub async fn new(name: String, bytecode: Bytes, config: WasmConfig) -> Result<Self> {
        // In a real implementation, this would:
        // 1. Validate WASM bytecode
        // 2. Compile the module
        // 3. Extract exports and imports
        // 4. Set up security policies

        let hash = blake3::hash(&bytecode).to_hex().to_string();

        // Mock export functions for craps game
        let mut exports = HashMap::new();
        exports.insert("execute_game_action".to_string(), WasmFunctionSignature {
            name: "execute_game_action".to_string(),
            parameters: vec![WasmValueType::I32, WasmValueType::I32], // pointers to action and state
            returns: vec![WasmValueType::I32], // pointer to new state
        });
        exports.insert("validate_move".to_string(), WasmFunctionSignature {
            name: "validate_move".to_string(),
            parameters: vec![WasmValueType::I32, WasmValueType::I32], // pointers to action and state
            returns: vec![WasmValueType::I32], // boolean result
        });
        exports.insert("calculate_outcome".to_string(), WasmFunctionSignature {
            name: "calculate_outcome".to_string(),
            parameters: vec![WasmValueType::I32], // pointer to state
            returns: vec![WasmValueType::I32], // pointer to outcome map
        });

        let imports = HashMap::new(); // Would extract from actual module

        Ok(Self {
            name,
            bytecode,
            config,
            exports,
            imports,
            compiled_at: Instant::now(),
            hash,
        })
    }

    /// Get function signature by name
    pub fn get_function_signature(&self, name: &str) -> Option<&WasmFunctionSignature> {
        self.exports.get(name)
    }

    /// Check if module has a specific export
    pub fn has_export(&self, name: &str) -> bool {
        self.exports.contains_key(name)
    }

    /// Get module size in bytes
    pub fn size(&self) -> usize {
        self.bytecode.len()
    }

    /// Validate the module bytecode
    pub fn validate(&self) -> Result<()> {
        // In a real implementation, this would:
        // 1. Parse WASM bytecode
        // 2. Validate structure
        // 3. Check for security violations
        // 4. Verify imports match available host functions

        if self.bytecode.is_empty() {
            return Err(Error::Wasm("Empty WASM module".to_string()));
        }

        if self.bytecode.len() < 8 {
            return Err(Error::Wasm("Invalid WASM module header".to_string()));
        }

        // Check WASM magic number (0x00 0x61 0x73 0x6d)
        let magic = &self.bytecode[0..4];
        if magic != b"\x00asm" {
            return Err(Error::Wasm("Invalid WASM magic number".to_string()));
        }

        Ok(())
    }
}

/// A WASM module instance
pub struct WasmInstance {
    /// Instance ID
    pub id: Uuid,
    /// Module reference
    pub module: Arc<WasmModule>,
    /// Host functions
    pub host_functions: Arc<WasmHostFunctions>,
    /// Memory manager
    pub memory_manager: Arc<WasmMemoryManager>,
    /// Instance memory
    pub memory: Vec<u8>,
    /// Fuel remaining
    pub fuel: u64,
    /// Execution stack
    pub stack: Vec<WasmValue>,
    /// Global variables
    pub globals: HashMap<String, WasmValue>,
    /// Instance state
    pub state: WasmInstanceState,
    /// Creation time
    pub created_at: Instant,
}

/// WASM instance state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WasmInstanceState {
    Created,
    Initialized,
    Running,
    Suspended,
    Terminated,
    Error,
}

impl WasmInstance {
    /// Create a new WASM instance
    pub async fn new(
        id: Uuid,
        module: Arc<WasmModule>,
        host_functions: Arc<WasmHostFunctions>,
        memory_manager: Arc<WasmMemoryManager>,
    ) -> Result<Self> {
        // Allocate memory for the instance
        let memory_size = module.config.max_memory.min(16 * 1024 * 1024); // Cap at 16MB
        let memory = memory_manager.allocate_memory(id, memory_size).await?;

        let instance = Self {
            id,
            module: module.clone(),
            host_functions,
            memory_manager,
            memory,
            fuel: module.config.fuel_limit,
            stack: Vec::new(),
            globals: HashMap::new(),
            state: WasmInstanceState::Created,
            created_at: Instant::now(),
        };

        Ok(instance)
    }

    /// Initialize the instance
    pub async fn initialize(&mut self) -> Result<()> {
        if self.state != WasmInstanceState::Created {
            return Err(Error::Wasm("Instance already initialized".to_string()));
        }

        // In a real implementation, this would:
        // 1. Set up the execution environment
        // 2. Link imported functions
        // 3. Initialize global variables
        // 4. Call start function if present

        self.state = WasmInstanceState::Initialized;
        log::debug!("Initialized WASM instance {}", self.id);
        Ok(())
    }

    /// Execute a function in the instance
    pub async fn execute_function(&mut self, name: &str, args: Vec<WasmValue>) -> Result<WasmValue> {
        if self.state != WasmInstanceState::Initialized && self.state != WasmInstanceState::Suspended {
            return Err(Error::Wasm(format!("Instance in invalid state: {:?}", self.state)));
        }

        // Check if function exists
        let _signature = self.module.get_function_signature(name)
            .ok_or_else(|| Error::Wasm(format!("Function '{}' not found", name)))?;

        // Check fuel
        if self.fuel == 0 {
            return Err(Error::Wasm("Out of fuel".to_string()));
        }

        self.state = WasmInstanceState::Running;

        // In a real implementation, this would:
        // 1. Validate argument types
        // 2. Set up execution context
        // 3. Execute the function with fuel metering
        // 4. Handle traps and errors
        // 5. Return result

        // Mock execution for different functions
        let result = match name {
            "execute_game_action" => {
                self.consume_fuel(1000)?;
                // Mock game action execution
                WasmValue::String("{\"phase\":\"come_out\",\"point\":null}".to_string())
            }
            "validate_move" => {
                self.consume_fuel(500)?;
                // Mock move validation
                WasmValue::I32(1) // true
            }
            "calculate_outcome" => {
                self.consume_fuel(750)?;
                // Mock outcome calculation
                WasmValue::String("{}".to_string()) // empty outcome map
            }
            _ => {
                self.consume_fuel(100)?;
                WasmValue::Null
            }
        };

        self.state = WasmInstanceState::Suspended;
        Ok(result)
    }

    /// Consume fuel for operation
    fn consume_fuel(&mut self, amount: u64) -> Result<()> {
        if self.fuel < amount {
            self.state = WasmInstanceState::Error;
            return Err(Error::Wasm("Out of fuel".to_string()));
        }
        self.fuel -= amount;
        Ok(())
    }

    /// Read from instance memory
    pub fn read_memory(&self, offset: usize, size: usize) -> Result<&[u8]> {
        if offset + size > self.memory.len() {
            return Err(Error::Wasm("Memory access out of bounds".to_string()));
        }
        Ok(&self.memory[offset..offset + size])
    }

    /// Write to instance memory
    pub fn write_memory(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        if offset + data.len() > self.memory.len() {
            return Err(Error::Wasm("Memory write out of bounds".to_string()));
        }
        self.memory[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Get current fuel level
    pub fn get_fuel(&self) -> u64 {
        self.fuel
    }

    /// Set fuel level
    pub fn set_fuel(&mut self, fuel: u64) {
        self.fuel = fuel;
    }

    /// Get memory usage
    pub fn memory_usage(&self) -> usize {
        self.memory.len()
    }

    /// Get stack depth
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Push value onto stack
    pub fn push_stack(&mut self, value: WasmValue) -> Result<()> {
        if self.stack.len() >= 1000 { // Max stack depth
            return Err(Error::Wasm("Stack overflow".to_string()));
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pop value from stack
    pub fn pop_stack(&mut self) -> Result<WasmValue> {
        self.stack.pop().ok_or_else(|| Error::Wasm("Stack underflow".to_string()))
    }

    /// Set global variable
    pub fn set_global(&mut self, name: String, value: WasmValue) {
        self.globals.insert(name, value);
    }

    /// Get global variable
    pub fn get_global(&self, name: &str) -> Option<&WasmValue> {
        self.globals.get(name)
    }

    /// Suspend the instance
    pub fn suspend(&mut self) -> Result<()> {
        if self.state == WasmInstanceState::Running {
            self.state = WasmInstanceState::Suspended;
        }
        Ok(())
    }

    /// Resume the instance
    pub fn resume(&mut self) -> Result<()> {
        if self.state == WasmInstanceState::Suspended {
            self.state = WasmInstanceState::Running;
        }
        Ok(())
    }

    /// Terminate the instance
    pub fn terminate(&mut self) -> Result<()> {
        self.state = WasmInstanceState::Terminated;
        self.stack.clear();
        self.globals.clear();
        Ok(())
    }

    /// Cleanup instance resources
    pub async fn cleanup(&mut self) -> Result<()> {
        self.terminate()?;
        
        // Free memory
        self.memory_manager.free_memory(self.id).await?;
        
        log::debug!("Cleaned up WASM instance {}", self.id);
        Ok(())
    }

    /// Get instance statistics
    pub fn get_stats(&self) -> WasmInstanceStats {
        WasmInstanceStats {
            id: self.id,
            module_name: self.module.name.clone(),
            state: self.state,
            fuel_remaining: self.fuel,
            memory_used: self.memory.len(),
            stack_depth: self.stack.len(),
            globals_count: self.globals.len(),
            uptime: self.created_at.elapsed(),
        }
    }
}

/// WASM instance statistics
#[derive(Debug, Clone)]
pub struct WasmInstanceStats {
    pub id: Uuid,
    pub module_name: String,
    pub state: WasmInstanceState,
    pub fuel_remaining: u64,
    pub memory_used: usize,
    pub stack_depth: usize,
    pub globals_count: usize,
    pub uptime: std::time::Duration,
}

/// WASM execution engine
pub struct WasmEngine {
    /// Engine configuration
    config: WasmConfig,
    /// Compiled modules cache
    module_cache: Arc<RwLock<HashMap<String, Arc<WasmModule>>>>,
    /// Engine statistics
    stats: WasmEngineStats,
}

/// WASM engine statistics
#[derive(Debug, Clone, Default)]
pub struct WasmEngineStats {
    pub modules_compiled: u64,
    pub instances_created: u64,
    pub functions_executed: u64,
    pub total_fuel_consumed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl WasmEngine {
    /// Create a new WASM engine
    pub fn new(config: WasmConfig) -> Self {
        Self {
            config,
            module_cache: Arc::new(RwLock::new(HashMap::new())),
            stats: WasmEngineStats::default(),
        }
    }

    /// Compile a WASM module
    pub async fn compile_module(&mut self, name: String, bytecode: Bytes) -> Result<Arc<WasmModule>> {
        // Check cache first
        {
            let cache = self.module_cache.read().await;
            if let Some(module) = cache.get(&name) {
                self.stats.cache_hits += 1;
                return Ok(module.clone());
            }
        }

        // Compile new module
        let module = WasmModule::new(name.clone(), bytecode, self.config.clone()).await?;
        module.validate()?;

        let module_arc = Arc::new(module);

        // Add to cache if enabled
        if self.config.enable_cache {
            let mut cache = self.module_cache.write().await;
            cache.insert(name, module_arc.clone());
        }

        self.stats.modules_compiled += 1;
        self.stats.cache_misses += 1;

        Ok(module_arc)
    }

    /// Clear module cache
    pub async fn clear_cache(&mut self) {
        let mut cache = self.module_cache.write().await;
        cache.clear();
        log::debug!("Cleared WASM module cache");
    }

    /// Get engine statistics
    pub fn get_stats(&self) -> &WasmEngineStats {
        &self.stats
    }

    /// Update statistics
    pub fn update_stats(&mut self, instances_created: u64, functions_executed: u64, fuel_consumed: u64) {
        self.stats.instances_created += instances_created;
        self.stats.functions_executed += functions_executed;
        self.stats.total_fuel_consumed += fuel_consumed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wasm_module_creation() {
        let config = WasmConfig::default();
        let bytecode = Bytes::from(b"\x00asm\x01\x00\x00\x00".to_vec()); // Mock WASM header
        
        let module = WasmModule::new("test".to_string(), bytecode, config).await.unwrap();
        
        assert_eq!(module.name, "test");
        assert!(module.has_export("execute_game_action"));
        assert!(!module.has_export("non_existent"));
    }

    #[tokio::test]
    async fn test_wasm_module_validation() {
        let config = WasmConfig::default();
        
        // Valid WASM header
        let valid_bytecode = Bytes::from(b"\x00asm\x01\x00\x00\x00".to_vec());
        let valid_module = WasmModule::new("valid".to_string(), valid_bytecode, config.clone()).await.unwrap();
        assert!(valid_module.validate().is_ok());
        
        // Invalid WASM header
        let invalid_bytecode = Bytes::from(b"invalid".to_vec());
        let invalid_module = WasmModule::new("invalid".to_string(), invalid_bytecode, config).await.unwrap();
        assert!(invalid_module.validate().is_err());
    }

    #[tokio::test]
    async fn test_wasm_instance_lifecycle() {
        use crate::wasm::{WasmHostFunctions, WasmMemoryManager};
        
        let config = WasmConfig::default();
        let bytecode = Bytes::from(b"\x00asm\x01\x00\x00\x00".to_vec());
        let module = Arc::new(WasmModule::new("test".to_string(), bytecode, config).await.unwrap());
        
        let host_functions = Arc::new(WasmHostFunctions::new());
        let memory_manager = Arc::new(WasmMemoryManager::new(1024 * 1024));
        
        let instance_id = Uuid::new_v4();
        let mut instance = WasmInstance::new(instance_id, module, host_functions, memory_manager).await.unwrap();
        
        assert_eq!(instance.state, WasmInstanceState::Created);
        
        instance.initialize().await.unwrap();
        assert_eq!(instance.state, WasmInstanceState::Initialized);
        
        instance.cleanup().await.unwrap();
        assert_eq!(instance.state, WasmInstanceState::Terminated);
    }

    #[tokio::test]
    async fn test_wasm_instance_memory() {
        use crate::wasm::{WasmHostFunctions, WasmMemoryManager};
        
        let config = WasmConfig::default();
        let bytecode = Bytes::from(b"\x00asm\x01\x00\x00\x00".to_vec());
        let module = Arc::new(WasmModule::new("test".to_string(), bytecode, config).await.unwrap());
        
        let host_functions = Arc::new(WasmHostFunctions::new());
        let memory_manager = Arc::new(WasmMemoryManager::new(1024 * 1024));
        
        let instance_id = Uuid::new_v4();
        let mut instance = WasmInstance::new(instance_id, module, host_functions, memory_manager).await.unwrap();
        
        // Test memory operations
        let test_data = b"hello world";
        instance.write_memory(0, test_data).unwrap();
        
        let read_data = instance.read_memory(0, test_data.len()).unwrap();
        assert_eq!(read_data, test_data);
        
        // Test out of bounds
        assert!(instance.read_memory(instance.memory.len(), 1).is_err());
        assert!(instance.write_memory(instance.memory.len(), b"x").is_err());
    }

    #[tokio::test]
    async fn test_wasm_instance_stack() {
        use crate::wasm::{WasmHostFunctions, WasmMemoryManager};
        
        let config = WasmConfig::default();
        let bytecode = Bytes::from(b"\x00asm\x01\x00\x00\x00".to_vec());
        let module = Arc::new(WasmModule::new("test".to_string(), bytecode, config).await.unwrap());
        
        let host_functions = Arc::new(WasmHostFunctions::new());
        let memory_manager = Arc::new(WasmMemoryManager::new(1024 * 1024));
        
        let instance_id = Uuid::new_v4();
        let mut instance = WasmInstance::new(instance_id, module, host_functions, memory_manager).await.unwrap();
        
        // Test stack operations
        instance.push_stack(WasmValue::I32(42)).unwrap();
        instance.push_stack(WasmValue::String("test".to_string())).unwrap();
        
        assert_eq!(instance.stack_depth(), 2);
        
        let value = instance.pop_stack().unwrap();
        match value {
            WasmValue::String(s) => assert_eq!(s, "test"),
            _ => panic!("Unexpected value type"),
        }
        
        let value = instance.pop_stack().unwrap();
        match value {
            WasmValue::I32(i) => assert_eq!(i, 42),
            _ => panic!("Unexpected value type"),
        }
        
        assert_eq!(instance.stack_depth(), 0);
        assert!(instance.pop_stack().is_err()); // Stack underflow
    }
}