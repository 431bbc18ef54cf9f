//! Utility functions: seeding, device selection and array/tensor conversion.

use crate::Result;
use ndarray::{Array1, ArrayView1, ArrayView2};
use tch::{Device, Kind, Tensor};

/// Set global random seed
pub fn set_seed(seed: u64) {
    tch::manual_seed(seed as i64);
}

/// Pick the device parameters are placed on.
///
/// Falls back to CPU when a GPU is requested but CUDA is unavailable.
pub fn init_device(use_gpu: bool, gpu_id: usize) -> Device {
    if use_gpu && tch::Cuda::is_available() {
        tracing::info!(gpu_id, "Using GPU");
        Device::Cuda(gpu_id)
    } else {
        if use_gpu {
            tracing::warn!("GPU requested but CUDA is unavailable, falling back to CPU");
        }
        tracing::info!("Using CPU");
        Device::Cpu
    }
}

/// Copy a vector into a float tensor of shape `[n]`
pub fn from_array1(array: ArrayView1<f32>, device: Device) -> Tensor {
    let data: Vec<f32> = array.iter().copied().collect();
    Tensor::from_slice(&data).to_device(device)
}

/// Copy a matrix into a float tensor of shape `[rows, cols]`
pub fn from_array2(array: ArrayView2<f32>, device: Device) -> Tensor {
    let (rows, cols) = array.dim();
    let data: Vec<f32> = array.iter().copied().collect();
    Tensor::from_slice(&data)
        .reshape([rows as i64, cols as i64])
        .to_device(device)
}

/// Copy action indices into an int64 tensor of shape `[n]`
pub fn from_index_array(array: ArrayView1<i64>, device: Device) -> Tensor {
    let data: Vec<i64> = array.iter().copied().collect();
    Tensor::from_slice(&data).to_device(device)
}

/// Flatten a tensor and copy it back to host memory as `f32`
pub fn to_vec_f32(tensor: &Tensor) -> Result<Vec<f32>> {
    let flat = tensor
        .detach()
        .to_device(Device::Cpu)
        .to_kind(Kind::Float)
        .flatten(0, -1);
    Ok(Vec::<f32>::try_from(flat)?)
}

/// Flatten a tensor into an owned `Array1<f32>`
pub fn to_array1(tensor: &Tensor) -> Result<Array1<f32>> {
    Ok(Array1::from(to_vec_f32(tensor)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_array2_round_trip_layout() {
        let obs = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let t = from_array2(obs.view(), Device::Cpu);
        assert_eq!(t.size(), [2, 3]);
        assert_eq!(t.kind(), Kind::Float);
        assert_eq!(t.double_value(&[1, 0]), 4.0);
    }

    #[test]
    fn test_transposed_view_is_copied_in_logical_order() {
        let obs = array![[1.0f32, 2.0], [3.0, 4.0]];
        let t = from_array2(obs.t(), Device::Cpu);
        assert_eq!(to_vec_f32(&t).unwrap(), vec![1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_index_array() {
        let actions = array![2i64, 0, 1];
        let t = from_index_array(actions.view(), Device::Cpu);
        assert_eq!(t.kind(), Kind::Int64);
        assert_eq!(t.int64_value(&[0]), 2);
    }

    #[test]
    fn test_to_array1_flattens() {
        let t = Tensor::from_slice(&[0.5f32, 1.5, 2.5, 3.5]).reshape([2, 2]);
        assert_eq!(to_array1(&t).unwrap(), array![0.5f32, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_init_device_cpu() {
        assert_eq!(init_device(false, 0), Device::Cpu);
    }
}
