//! Backend type aliases and device management
//!
//! Observations are plain CPU tensors; the NdArray backend is enough for the
//! small windows produced per agent. Callers with their own backend can build
//! a `CoverageEnvironment<B>` for any `B: Backend`.

use burn::backend::ndarray::{NdArray, NdArrayDevice};

/// Backend used for observation tensors by default
pub type ObservationBackend = NdArray<f32>;

/// Get the default device for observation tensors
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_device_calls() {
        let device1 = default_device();
        let device2 = default_device();
        assert_eq!(
            std::mem::discriminant(&device1),
            std::mem::discriminant(&device2)
        );
    }
}
