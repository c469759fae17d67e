//! 損失履歴の記録と診断用グラフの出力。

use plotters::prelude::*;
use std::path::Path;

/// 学習中の損失履歴。追記専用で、条件ごとの系列は常にヘッダと揃っています。
#[derive(Debug, Clone)]
pub struct LossRecord {
    condition_names: Vec<String>,
    epochs: Vec<usize>,
    total: Vec<f32>,
    per_condition: Vec<Vec<f32>>,
}

impl LossRecord {
    /// 条件名のヘッダを固定して空の履歴を作成します。
    pub fn new(condition_names: Vec<String>) -> Self {
        let n = condition_names.len();
        Self {
            condition_names,
            epochs: Vec::new(),
            total: Vec::new(),
            per_condition: vec![Vec::new(); n],
        }
    }

    /// 1エポック分の損失を追記します。
    ///
    /// per_conditionの並びはヘッダの条件名と一致していなければなりません。
    pub fn append(&mut self, epoch: usize, total: f32, per_condition: &[f32]) {
        assert_eq!(
            per_condition.len(),
            self.condition_names.len(),
            "条件別損失の数がヘッダと一致しません"
        );
        self.epochs.push(epoch);
        self.total.push(total);
        for (series, &value) in self.per_condition.iter_mut().zip(per_condition) {
            series.push(value);
        }
    }

    /// 記録済みのエポック数を返します。
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// まだ何も記録されていない場合にtrueを返します。
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// 条件名のヘッダを返します。
    pub fn condition_names(&self) -> &[String] {
        &self.condition_names
    }

    /// 記録されたエポック番号の列を返します。
    pub fn epochs(&self) -> &[usize] {
        &self.epochs
    }

    /// 合計損失の系列を返します。
    pub fn total(&self) -> &[f32] {
        &self.total
    }

    /// 最後に記録された合計損失を返します。
    pub fn last_total(&self) -> Option<f32> {
        self.total.last().copied()
    }

    /// 指定した条件の損失系列を返します。
    pub fn series(&self, condition: &str) -> Option<&[f32]> {
        self.condition_names
            .iter()
            .position(|name| name == condition)
            .map(|idx| self.per_condition[idx].as_slice())
    }

    /// 損失履歴をグラフとしてPNGファイルに出力します。
    ///
    /// 合計損失と条件別損失をlog10スケールで重ねて描画します。
    pub fn plot(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if self.is_empty() {
            return Ok(());
        }
        let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
        root.fill(&WHITE)?;
        let max_log_loss = self
            .total
            .iter()
            .fold(f32::MIN, |acc, &v| acc.max(log10_clamped(v)))
            + 0.5;
        let min_log_loss = self
            .total
            .iter()
            .fold(f32::MAX, |acc, &v| acc.min(log10_clamped(v)))
            - 0.5;
        let last_epoch = *self.epochs.last().unwrap_or(&1);
        let mut chart = ChartBuilder::on(&root)
            .caption("Loss History", ("sans-serif", 40).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..last_epoch + 1, min_log_loss..max_log_loss)?;
        chart
            .configure_mesh()
            .y_desc("Loss (log10 scale)")
            .x_desc("Epochs")
            .draw()?;
        chart
            .draw_series(LineSeries::new(
                self.epochs
                    .iter()
                    .zip(&self.total)
                    .map(|(&epoch, &val)| (epoch, log10_clamped(val))),
                RED.stroke_width(2),
            ))?
            .label("Total Loss")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
        for (idx, (name, series)) in self
            .condition_names
            .iter()
            .zip(&self.per_condition)
            .enumerate()
        {
            let color = Palette99::pick(idx).mix(0.9);
            chart
                .draw_series(LineSeries::new(
                    self.epochs
                        .iter()
                        .zip(series)
                        .map(|(&epoch, &val)| (epoch, log10_clamped(val))),
                    color.stroke_width(1),
                ))?
                .label(name)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(1))
                });
        }
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }
}

/// log10を取る前に損失を正の最小値へ切り上げます。損失がちょうど0でも
/// 軸の範囲が-infにならないようにします。
fn log10_clamped(value: f32) -> f32 {
    value.max(f32::MIN_POSITIVE).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_append_only_and_keeps_series_aligned() {
        let mut record = LossRecord::new(vec!["boundary".to_string(), "interior".to_string()]);
        assert!(record.is_empty());
        record.append(1, 1.5, &[1.0, 0.5]);
        record.append(2, 0.8, &[0.5, 0.3]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.epochs(), &[1, 2]);
        assert_eq!(record.total(), &[1.5, 0.8]);
        assert_eq!(record.last_total(), Some(0.8));
        assert_eq!(record.series("boundary"), Some(&[1.0, 0.5][..]));
        assert_eq!(record.series("interior"), Some(&[0.5, 0.3][..]));
        assert_eq!(record.series("unknown"), None);
    }

    #[test]
    fn zero_losses_plot_with_a_finite_axis_range() {
        assert!(log10_clamped(0.0).is_finite());
        let mut record = LossRecord::new(vec!["interior".to_string()]);
        record.append(1, 1.0, &[1.0]);
        record.append(2, 0.0, &[0.0]);
        let path = std::env::temp_dir().join("pinn_lab_zero_loss_graph.png");
        record.plot(&path).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    #[should_panic]
    fn mismatched_per_condition_losses_are_rejected() {
        let mut record = LossRecord::new(vec!["interior".to_string()]);
        record.append(1, 1.0, &[1.0, 2.0]);
    }
}
