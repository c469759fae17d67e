//! 残差評価用の勾配オペレータ。
//!
//! 自動微分で出力変数ごとの1階偏導関数を取り出し、残差関数が受け取る
//! `FieldSample`に束ねます。微分の取り方（require_grad → 順伝播 → sum →
//! backward → grad）は移流方程式の物理損失で使っていたものと同じです。

use crate::model::FeedForward;
use crate::problem::FieldSample;
use burn::tensor::Tensor;
use burn::tensor::backend::AutodiffBackend;

/// 出力変数ごとに、全入力変数に関する1階偏導関数を計算します。
///
/// 戻り値はn_outputs個のテンソルで、それぞれ [n, 入力変数数] の形です。
pub fn partials<B: AutodiffBackend>(
    model: &FeedForward<B>,
    coords: Tensor<B, 2>,
    n_outputs: usize,
) -> Vec<Tensor<B, 2>> {
    let n = coords.dims()[0];
    (0..n_outputs)
        .map(|output| {
            let coords_grad = coords.clone().require_grad();
            let u = model.forward(coords_grad.clone());
            let u_j = u.slice([0..n, output..output + 1]);
            let grads = u_j.sum().backward();
            let grads_inner = coords_grad.grad(&grads).unwrap();
            Tensor::<B, 2>::from_inner(grads_inner)
        })
        .collect()
}

/// 点群に対する順伝播と偏導関数をまとめて評価します。
pub fn field_sample<B: AutodiffBackend>(
    model: &FeedForward<B>,
    coords: Tensor<B, 2>,
    n_outputs: usize,
) -> FieldSample<B> {
    let outputs = model.forward(coords.clone());
    let gradients = partials(model, coords.clone(), n_outputs);
    FieldSample {
        inputs: coords,
        outputs,
        gradients,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeedForwardConfig;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::Distribution;

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn partials_have_one_gradient_per_output_variable() {
        let device = Default::default();
        let config = FeedForwardConfig::new(2, 3).with_hidden(8).with_layers(3);
        let model = FeedForward::<TestBackend>::new(&config, &device);
        let coords =
            Tensor::<TestBackend, 2>::random([5, 2], Distribution::Uniform(-1.0, 1.0), &device);
        let grads = partials(&model, coords, 3);
        assert_eq!(grads.len(), 3);
        for grad in &grads {
            assert_eq!(grad.dims(), [5, 2]);
        }
    }

    #[test]
    fn partials_match_a_central_difference() {
        let device = Default::default();
        let config = FeedForwardConfig::new(2, 1).with_hidden(8).with_layers(3);
        let model = FeedForward::<TestBackend>::new(&config, &device);
        let coords = Tensor::<TestBackend, 2>::from_floats([[0.3, -0.2]], &device);
        let grads = partials(&model, coords, 1);
        let grad: Vec<f32> = grads[0].clone().into_data().to_vec().unwrap();

        let h = 0.05;
        for input in 0..2 {
            let mut plus = [0.3, -0.2];
            let mut minus = [0.3, -0.2];
            plus[input] += h;
            minus[input] -= h;
            let u_plus: Vec<f32> = model
                .forward(Tensor::from_floats([plus], &device))
                .into_data()
                .to_vec()
                .unwrap();
            let u_minus: Vec<f32> = model
                .forward(Tensor::from_floats([minus], &device))
                .into_data()
                .to_vec()
                .unwrap();
            let fd = (u_plus[0] - u_minus[0]) / (2.0 * h);
            assert!(
                (grad[input] - fd).abs() < 0.05,
                "偏導関数 {} が数値微分とかけ離れています: {} vs {}",
                input,
                grad[input],
                fd
            );
        }
    }

    #[test]
    fn field_sample_bundles_forward_pass_and_gradients() {
        let device = Default::default();
        let config = FeedForwardConfig::new(2, 1).with_hidden(8).with_layers(3);
        let model = FeedForward::<TestBackend>::new(&config, &device);
        let coords =
            Tensor::<TestBackend, 2>::random([7, 2], Distribution::Uniform(0.0, 1.0), &device);
        let sample = field_sample(&model, coords, 1);
        assert_eq!(sample.inputs.dims(), [7, 2]);
        assert_eq!(sample.outputs.dims(), [7, 1]);
        assert_eq!(sample.gradients.len(), 1);
        assert_eq!(sample.partial(0, 1).dims(), [7, 1]);
    }
}
