//! iOS system monitoring implementation
//!
//! Uses iOS system APIs via FFI and Core Foundation

use super::{SystemMonitor, SystemMetrics, SystemMonitorError, MetricType, NetworkInterface};
use std::collections::HashMap;
use std::time::SystemTime;

#[cfg(target_os = "ios")]
use std::os::raw::{c_void, c_int, c_uint, c_char, c_double};

pub struct IOSSystemMonitor {
    // iOS-specific state if needed
}

// iOS FFI declarations
#[cfg(target_os = "ios")]
extern "C" {
    // Host statistics (CPU usage)
    fn host_processor_info(
        host: c_uint,
        flavor: c_int,
        out_processor_count: *mut c_uint,
        processor_info: *mut *mut c_int,
        processor_info_count: *mut c_uint,
    ) -> c_int;
    
    // Memory statistics
    fn host_statistics(
        host: c_uint, 
        flavor: c_int, 
        host_info: *mut c_void, 
        host_info_count: *mut c_uint
    ) -> c_int;
    
    // Get host port
    fn mach_host_self() -> c_uint;
    
    // VM statistics
    fn vm_deallocate(target_task: c_uint, address: *mut c_void, size: c_uint) -> c_int;
}

#[cfg(target_os = "ios")]
const HOST_CPU_LOAD_INFO: c_int = 3;
#[cfg(target_os = "ios")]
const HOST_VM_INFO: c_int = 2;

#[cfg(target_os = "ios")]
#[repr(C)]
struct HostCpuLoadInfo {
    cpu_ticks: [c_uint; 4], // USER, SYSTEM, IDLE, NICE
}

#[cfg(target_os = "ios")]
#[repr(C)]
struct VmStatistics {
    free_count: c_uint,
    active_count: c_uint,
    inactive_count: c_uint,
    wire_count: c_uint,
    zero_fill_count: c_uint,
    reactivations: c_uint,
    pageins: c_uint,
    pageouts: c_uint,
    faults: c_uint,
    cow_faults: c_uint,
    lookups: c_uint,
    hits: c_uint,
}

impl IOSSystemMonitor {
    pub fn new() -> Self {
        Self {}
    }
    
    /// Get CPU usage using host_processor_info
    #[cfg(target_os = "ios")]
    fn get_cpu_usage(&self) -> Result<f32, SystemMonitorError> {
        unsafe {
            let host = mach_host_self();
            let mut processor_count: c_uint = 0;
            let mut processor_info: *mut c_int = std::ptr::null_mut();
            let mut processor_info_count: c_uint = 0;
            
            let result = host_processor_info(
                host,
                HOST_CPU_LOAD_INFO,
                &mut processor_count,
                &mut processor_info,
                &mut processor_info_count,
            );
            
            if result != 0 {
                return Err(SystemMonitorError::SystemApiError(format!("host_processor_info failed: {}", result)));
            }
            
            // Calculate CPU usage from tick counts
            let info = processor_info as *const HostCpuLoadInfo;
            let cpu_info = &*info;
            
            let user = cpu_info.cpu_ticks[0] as u64;
            let system = cpu_info.cpu_ticks[1] as u64;
            let idle = cpu_info.cpu_ticks[2] as u64;
            let nice = cpu_info.cpu_ticks[3] as u64;
            
            let total = user + system + idle + nice;
            let used = total - idle;
            
            // Clean up allocated memory
            vm_deallocate(
                mach_host_self(),
                processor_info as *mut c_void,
                processor_info_count,
            );
            
            let cpu_usage = if total == 0 {
                0.0
            } else {
                (used as f32 / total as f32) * 100.0
            };
            
            Ok(cpu_usage)
        }
    }
    
    #[cfg(not(target_os = "ios"))]
    fn get_cpu_usage(&self) -> Result<f32, SystemMonitorError> {
        Err(SystemMonitorError::PlatformNotSupported("iOS CPU monitoring not available".to_string()))
    }
    
    /// Get memory information using host_statistics
    #[cfg(target_os = "ios")]
    fn get_memory_info(&self) -> Result<(u64, u64, u64), SystemMonitorError> {
        unsafe {
            let host = mach_host_self();
            let mut vm_stat = VmStatistics {
                free_count: 0,
                active_count: 0,
                inactive_count: 0,
                wire_count: 0,
                zero_fill_count: 0,
                reactivations: 0,
                pageins: 0,
                pageouts: 0,
                faults: 0,
                cow_faults: 0,
                lookups: 0,
                hits: 0,
            };
            let mut count = std::mem::size_of::<VmStatistics>() as c_uint / std::mem::size_of::<c_uint>() as c_uint;
            
            let result = host_statistics(
                host,
                HOST_VM_INFO,
                &mut vm_stat as *mut _ as *mut c_void,
                &mut count,
            );
            
            if result != 0 {
                return Err(SystemMonitorError::SystemApiError(format!("host_statistics failed: {}", result)));
            }
            
            // iOS page size is typically 4KB
            let page_size = 4096u64;
            
            let free_bytes = vm_stat.free_count as u64 * page_size;
            let active_bytes = vm_stat.active_count as u64 * page_size;
            let inactive_bytes = vm_stat.inactive_count as u64 * page_size;
            let wire_bytes = vm_stat.wire_count as u64 * page_size;
            
            let total_bytes = free_bytes + active_bytes + inactive_bytes + wire_bytes;
            let used_bytes = active_bytes + wire_bytes;
            let available_bytes = free_bytes + inactive_bytes;
            
            Ok((total_bytes, used_bytes, available_bytes))
        }
    }
    
    #[cfg(not(target_os = "ios"))]
    fn get_memory_info(&self) -> Result<(u64, u64, u64), SystemMonitorError> {
        Err(SystemMonitorError::PlatformNotSupported("iOS memory monitoring not available".to_string()))
    }
    
    /// Get battery information via UIDevice (requires Objective-C bridge)
    #[cfg(target_os = "ios")]
    fn get_battery_info(&self) -> Result<(Option<f32>, Option<bool>), SystemMonitorError> {
        // This requires calling into UIKit, which needs an Objective-C bridge
        // For now, we'll return a placeholder that would be implemented via FFI
        
        // In a real implementation, you would:
        // 1. Call UIDevice.current.batteryMonitoringEnabled = true
        // 2. Get UIDevice.current.batteryLevel (0.0-1.0)
        // 3. Get UIDevice.current.batteryState (charging, unplugged, full, unknown)
        
        log::warn!("iOS battery monitoring requires UIKit bridge - not implemented yet");
        Ok((None, None))
    }
    
    #[cfg(not(target_os = "ios"))]
    fn get_battery_info(&self) -> Result<(Option<f32>, Option<bool>), SystemMonitorError> {
        Ok((None, None))
    }
    
    /// Get thermal information via ProcessInfo.processInfo.thermalState
    #[cfg(target_os = "ios")]
    fn get_thermal_info(&self) -> Result<(Option<f32>, bool), SystemMonitorError> {
        // This requires calling into Foundation framework
        // ProcessInfo.processInfo.thermalState returns:
        // - nominal (0): Normal
        // - fair (1): Fair
        // - serious (2): Serious throttling 
        // - critical (3): Critical throttling
        
        log::warn!("iOS thermal monitoring requires Foundation bridge - not implemented yet");
        Ok((None, false))
    }
    
    #[cfg(not(target_os = "ios"))]
    fn get_thermal_info(&self) -> Result<(Option<f32>, bool), SystemMonitorError> {
        Ok((None, false))
    }
    
    /// Get thread count for current process
    #[cfg(target_os = "ios")]
    fn get_thread_count(&self) -> Result<u32, SystemMonitorError> {
        // Use task_info to get thread count
        // This is available through mach APIs
        // For simplicity, return a placeholder
        Ok(std::thread::available_parallelism()
           .map(|n| n.get() as u32)
           .unwrap_or(1))
    }
    
    #[cfg(not(target_os = "ios"))]
    fn get_thread_count(&self) -> Result<u32, SystemMonitorError> {
        Ok(1)
    }
    
    /// Network interfaces are limited on iOS - mostly just WiFi and Cellular
    fn get_network_interfaces(&self) -> Result<HashMap<String, NetworkInterface>, SystemMonitorError> {
        let mut interfaces = HashMap::new();
        
        // iOS network monitoring is restricted
        // Basic interface would be available through SystemConfiguration framework
        // For now, provide minimal interface info
        
        interfaces.insert("en0".to_string(), NetworkInterface {
            name: "en0".to_string(),
            is_up: true,  // Assume WiFi is up
            bytes_sent: 0,     // Would need SystemConfiguration to get real values
            bytes_received: 0,
            packets_sent: 0,
            packets_received: 0,
        });
        
        Ok(interfaces)
    }
}

impl SystemMonitor for IOSSystemMonitor {
    fn collect_metrics(&self) -> Result<SystemMetrics, SystemMonitorError> {
        let cpu_usage = self.get_cpu_usage().unwrap_or(0.0);
        let (total_memory, used_memory, available_memory) = self.get_memory_info()
            .unwrap_or((0, 0, 0));
        let (battery_level, battery_charging) = self.get_battery_info()
            .unwrap_or((None, None));
        let (temperature, thermal_throttling) = self.get_thermal_info()
            .unwrap_or((None, false));
        let thread_count = self.get_thread_count().unwrap_or(1);
        let network_interfaces = self.get_network_interfaces()
            .unwrap_or_default();
        
        Ok(SystemMetrics {
            cpu_usage_percent: cpu_usage,
            available_memory_bytes: available_memory,
            used_memory_bytes: used_memory,
            total_memory_bytes: total_memory,
            battery_level,
            battery_charging,
            temperature_celsius: temperature,
            thermal_throttling,
            thread_count,
            network_interfaces,
            timestamp: SystemTime::now(),
        })
    }
    
    fn platform_name(&self) -> &str {
        "ios"
    }
    
    fn is_real_monitoring(&self) -> bool {
        #[cfg(target_os = "ios")]
        return true;
        
        #[cfg(not(target_os = "ios"))]
        return false;
    }
    
    fn supported_metrics(&self) -> Vec<MetricType> {
        vec![
            MetricType::CpuUsage,    // Available via host_processor_info
            MetricType::Memory,      // Available via host_statistics  
            MetricType::Battery,     // Requires UIKit bridge
            MetricType::Temperature, // Requires Foundation bridge
            MetricType::Network,     // Limited by iOS sandboxing
            MetricType::Threads,     // Available via task_info
        ]
    }
}

// Objective-C bridge functions for UIKit/Foundation access
// These would need to be implemented in a separate .m file

#[cfg(target_os = "ios")]
pub mod objc_bridge {
    use super::*;
    use std::os::raw::c_float;
    
    // These functions would be implemented in Objective-C
    extern "C" {
        /// Enable battery monitoring and get current level (0.0-1.0)
        fn ios_get_battery_level() -> c_float;
        
        /// Get battery charging state (0=unknown, 1=unplugged, 2=charging, 3=full)
        fn ios_get_battery_state() -> c_int;
        
        /// Get thermal state (0=nominal, 1=fair, 2=serious, 3=critical)
        fn ios_get_thermal_state() -> c_int;
        
        /// Get device model identifier
        fn ios_get_device_model(buffer: *mut c_char, buffer_size: c_uint) -> c_int;
    }
    
    /// Helper to get battery info via Objective-C bridge
    pub fn get_battery_info_objc() -> Result<(Option<f32>, Option<bool>), SystemMonitorError> {
        unsafe {
            let level = ios_get_battery_level();
            let state = ios_get_battery_state();
            
            let battery_level = if level >= 0.0 {
                Some(level * 100.0) // Convert to percentage
            } else {
                None
            };
            
            let battery_charging = match state {
                2 => Some(true),  // Charging
                1 | 3 => Some(false), // Unplugged or Full
                _ => None, // Unknown
            };
            
            Ok((battery_level, battery_charging))
        }
    }
    
    /// Helper to get thermal info via Objective-C bridge
    pub fn get_thermal_info_objc() -> Result<(Option<f32>, bool), SystemMonitorError> {
        unsafe {
            let thermal_state = ios_get_thermal_state();
            
            let throttling = thermal_state >= 2; // Serious or Critical
            
            // We don't get actual temperature, just thermal state
            Ok((None, throttling))
        }
    }
}
