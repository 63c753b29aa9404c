//! # 一元线性最小二乘
//!
//! ## 依赖关系
//! - 被 `analysis/slope.rs` 使用

use crate::error::{ElasticError, Result};

/// 拟合直线 `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

/// 普通最小二乘拟合
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() {
        return Err(ElasticError::InvalidArgument(format!(
            "regression needs paired samples ({} x, {} y)",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(ElasticError::InsufficientData {
            what: "linear regression".to_string(),
            needed: 2,
            got: n,
        });
    }

    let nf = n as f64;
    let mx = x.iter().sum::<f64>() / nf;
    let my = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut x2 = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        sxx += dx * dx;
        sxy += dx * (yi - my);
        x2 += xi * xi;
    }

    // x 全部相同（例如形变窗口内盒长未变）
    if !(sxx > f64::EPSILON * x2) {
        return Err(ElasticError::DegenerateFit(
            "regressor has no spread".to_string(),
        ));
    }

    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: my - slope * mx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_line() {
        let x: Vec<f64> = (0..100).map(|i| i as f64 * 1.0e-4).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.0e5 * v - 3.0).collect();
        let fit = linear_fit(&x, &y).unwrap();
        assert!((fit.slope - 1.0e5).abs() < 1e-6);
        assert!((fit.intercept + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_points_minimum() {
        assert!(matches!(
            linear_fit(&[1.0], &[2.0]),
            Err(ElasticError::InsufficientData { needed: 2, got: 1, .. })
        ));
        let fit = linear_fit(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_regressor_is_degenerate() {
        assert!(matches!(
            linear_fit(&[0.0; 10], &[1.0; 10]),
            Err(ElasticError::DegenerateFit(_))
        ));
        assert!(matches!(
            linear_fit(&[3.7; 10], &[1.0; 10]),
            Err(ElasticError::DegenerateFit(_))
        ));
    }
}
