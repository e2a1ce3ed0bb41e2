use ndarray::{Array1, ArrayView2, Axis};

/// Rectified sum pooling over consecutive blocks of activation columns.
///
/// `activations` is `K × (num_pools · patches_per_pool)` with the patches of
/// each pool stored contiguously. Pool `i` contributes
/// `Σ max(0, a)` per atom at `i * K .. (i + 1) * K` of the result.
pub fn rectified_sum_pool(activations: &ArrayView2<f64>, patches_per_pool: usize) -> Array1<f64> {
    let num_atoms = activations.nrows();
    let num_pools = activations.ncols() / patches_per_pool.max(1);
    let mut features = Array1::zeros(num_pools * num_atoms);

    for (pool, block) in activations
        .axis_chunks_iter(Axis(1), patches_per_pool.max(1))
        .take(num_pools)
        .enumerate()
    {
        let pooled = block.mapv(|a| a.max(0.0)).sum_axis(Axis(1));
        features
            .slice_mut(ndarray::s![pool * num_atoms..(pool + 1) * num_atoms])
            .assign(&pooled);
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn negative_activations_are_dropped() {
        // two atoms, two pools of two patches
        let a = array![[1.0, -2.0, 0.5, 0.5], [-1.0, -1.0, 3.0, -4.0]];
        let pooled = rectified_sum_pool(&a.view(), 2);
        assert_eq!(pooled, array![1.0, 0.0, 1.0, 3.0]);
    }

    #[test]
    fn single_patch_pools_are_relu() {
        let a = array![[-1.0, 2.0], [3.0, -4.0]];
        let pooled = rectified_sum_pool(&a.view(), 1);
        assert_eq!(pooled, array![0.0, 3.0, 2.0, 0.0]);
    }
}
