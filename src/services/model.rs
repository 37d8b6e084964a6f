//! 线性回归模型
//!
//! 固定种子的随机训练/测试集划分、带截距的普通最小二乘拟合以及均方误差

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

/// 模型相关错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("normal equations are singular")]
    SingularMatrix,

    #[error("cannot evaluate on an empty set")]
    EmptyEvaluationSet,
}

/// 训练/测试集下标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// 随机划分 `0..n`
///
/// 用固定种子打乱下标，前 `ceil(n * test_ratio)` 个为测试集，其余为训练集。
/// 相同的 (n, test_ratio, seed) 总是得到相同结果，不保留时间顺序
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> TrainTestSplit {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64 * test_ratio).ceil() as usize).min(n);
    let train = indices.split_off(n_test);

    TrainTestSplit {
        train,
        test: indices,
    }
}

/// 带截距的线性模型
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Array1<f64>,
}

impl LinearModel {
    /// 普通最小二乘拟合
    ///
    /// 先对特征和目标去中心化，再求解正规方程 X'X β = X'y，截距由均值还原
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self, ModelError> {
        if x.nrows() == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }

        let x_mean = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyTrainingSet)?;
        let y_mean = y.mean().ok_or(ModelError::EmptyTrainingSet)?;
        let x_centered = x - &x_mean;
        let y_centered = y - y_mean;

        let xt = x_centered.t();
        let xtx = xt.dot(&x_centered);
        let xty = xt.dot(&y_centered);

        let coefficients = solve(xtx, xty)?;
        let intercept = y_mean - coefficients.dot(&x_mean);

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    /// 逐行预测，列数须与拟合时一致
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if x.ncols() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: x.ncols(),
            });
        }
        Ok(x.dot(&self.coefficients) + self.intercept)
    }
}

/// 高斯消元（部分主元）求解 A x = b
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>, ModelError> {
    let p = b.len();
    let scale = a.diag().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale == 0.0 && p > 0 {
        return Err(ModelError::SingularMatrix);
    }
    let tolerance = scale * 1e-12;

    for col in 0..p {
        let pivot = (col..p)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() <= tolerance {
            return Err(ModelError::SingularMatrix);
        }
        if pivot != col {
            for k in 0..p {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..p {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..p {
                let delta = factor * a[[col, k]];
                a[[row, k]] -= delta;
            }
            let delta = factor * b[col];
            b[row] -= delta;
        }
    }

    let mut x = Array1::<f64>::zeros(p);
    for row in (0..p).rev() {
        let tail: f64 = (row + 1..p).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}

/// 均方误差 mean((actual - predicted)^2)
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64, ModelError> {
    if actual.len() != predicted.len() {
        return Err(ModelError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(ModelError::EmptyEvaluationSet);
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok(sum / actual.len() as f64)
}
