//! # Student-t 分布极大似然拟合
//!
//! 对一组样本拟合位置-尺度 Student-t 分布 `t(ν, μ, σ)`，返回全部三个参数。
//! 位置参数 μ 是对厚尾热涨落稳健的中心估计。
//!
//! ## 算法
//! ECM 迭代 (Liu & Rubin, 1995)：
//! 1. E 步：权重 `w_i = (ν + 1) / (ν + ((x_i - μ) / σ)²)`
//! 2. CM 步：加权均值更新 μ，加权二阶矩更新 σ²
//! 3. CM 步：在 ln ν 上二分求解自由度方程
//!    `ln(ν/2) - ψ(ν/2) + 1 + mean(ln w - w) + ψ((ν₀+1)/2) - ln((ν₀+1)/2) = 0`
//!
//! 样本先按中位数平移，避免大偏移量（如盒长 ~28 Å）下的抵消误差。
//!
//! ## 依赖关系
//! - 被 `analysis/estimators.rs`, `analysis/slope.rs` 使用
//! - 使用 `statrs` 的 digamma 函数

use crate::error::{ElasticError, Result};

use statrs::function::gamma::digamma;

const MAX_ITERATIONS: usize = 500;
const TOLERANCE: f64 = 1.0e-10;
const DF_MIN: f64 = 0.1;
const DF_MAX: f64 = 1.0e6;
const DF_INITIAL: f64 = 10.0;

/// 拟合结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentTFit {
    /// 自由度 ν
    pub df: f64,
    /// 位置参数 μ
    pub loc: f64,
    /// 尺度参数 σ
    pub scale: f64,
}

/// 拟合 Student-t 分布
pub fn fit_student_t(samples: &[f64]) -> Result<StudentTFit> {
    let n = samples.len();
    if n == 0 {
        return Err(ElasticError::InsufficientData {
            what: "Student-t fit".to_string(),
            needed: 1,
            got: 0,
        });
    }
    if samples.iter().any(|x| !x.is_finite()) {
        return Err(ElasticError::DegenerateFit(
            "non-finite sample in Student-t fit".to_string(),
        ));
    }

    let center = median(samples);
    let xs: Vec<f64> = samples.iter().map(|x| x - center).collect();
    let nf = n as f64;

    let var = xs.iter().map(|x| x * x).sum::<f64>() / nf;
    if var == 0.0 {
        return Ok(StudentTFit {
            df: DF_MAX,
            loc: center,
            scale: 0.0,
        });
    }

    let mut loc = 0.0;
    let mut scale = var.sqrt();
    let mut df = DF_INITIAL;
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS {
        iterations += 1;

        // E 步
        let mut sw = 0.0;
        let mut swx = 0.0;
        let mut sum_log_w_minus_w = 0.0;
        let weights: Vec<f64> = xs
            .iter()
            .map(|&x| {
                let d = (x - loc) / scale;
                let w = (df + 1.0) / (df + d * d);
                sw += w;
                swx += w * x;
                sum_log_w_minus_w += w.ln() - w;
                w
            })
            .collect();

        // CM 步：位置与尺度
        let new_loc = swx / sw;
        let s2 = xs
            .iter()
            .zip(&weights)
            .map(|(&x, &w)| w * (x - new_loc) * (x - new_loc))
            .sum::<f64>()
            / nf;
        // 绝大多数样本重合时尺度塌缩，位置已由重合值确定
        if s2 <= 0.0 || !s2.is_finite() {
            let loc = if new_loc.is_finite() { new_loc } else { loc };
            return Ok(StudentTFit {
                df,
                loc: loc + center,
                scale: 0.0,
            });
        }
        let new_scale = s2.sqrt();

        // CM 步：自由度
        let half = (df + 1.0) / 2.0;
        let c = sum_log_w_minus_w / nf + digamma(half) - half.ln();
        let new_df = solve_df(c);

        let converged = (new_loc - loc).abs() <= TOLERANCE * new_scale
            && (new_scale - scale).abs() <= TOLERANCE * new_scale
            && (new_df.ln() - df.ln()).abs() <= 1.0e-8;

        loc = new_loc;
        scale = new_scale;
        df = new_df;

        if converged {
            break;
        }
    }

    Ok(StudentTFit {
        df,
        loc: loc + center,
        scale,
    })
}

/// 在 [DF_MIN, DF_MAX] 内求解自由度方程（左端单调递减）
fn solve_df(c: f64) -> f64 {
    let g = |nu: f64| (nu / 2.0).ln() - digamma(nu / 2.0) + 1.0 + c;

    if g(DF_MAX) >= 0.0 {
        return DF_MAX;
    }
    if g(DF_MIN) <= 0.0 {
        return DF_MIN;
    }

    let mut lo = DF_MIN.ln();
    let mut hi = DF_MAX.ln();
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if g(mid.exp()) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1.0e-12 {
            break;
        }
    }
    (0.5 * (lo + hi)).exp()
}

fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal, StudentT};

    #[test]
    fn test_constant_samples() {
        let fit = fit_student_t(&[28.1448; 50]).unwrap();
        assert_eq!(fit.loc, 28.1448);
        assert_eq!(fit.scale, 0.0);
    }

    #[test]
    fn test_mostly_tied_samples() {
        // 量化输出：盒长在制备阶段几乎不动
        let mut samples = vec![28.1448; 90];
        samples.extend((0..10).map(|i| 28.1448 + 1.0e-4 * (i as f64 - 4.5)));
        let fit = fit_student_t(&samples).unwrap();
        assert!((fit.loc - 28.1448).abs() < 1.0e-4, "loc = {}", fit.loc);
        assert!(fit.scale.is_finite());
    }

    #[test]
    fn test_empty_is_insufficient() {
        assert!(matches!(
            fit_student_t(&[]),
            Err(ElasticError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_symmetric_samples() {
        let samples = [7.0, 9.0, 10.0, 11.0, 13.0, 10.0, 9.5, 10.5];
        let fit = fit_student_t(&samples).unwrap();
        assert!((fit.loc - 10.0).abs() < 1e-9, "loc = {}", fit.loc);
        assert!(fit.scale > 0.0);
    }

    #[test]
    fn test_resists_outliers() {
        let mut samples = vec![1.0, 1.1, 0.9, 1.05, 0.95, 1.02, 0.98, 1.0, 1.01, 0.99];
        samples.push(50.0);
        let fit = fit_student_t(&samples).unwrap();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((fit.loc - 1.0).abs() < 0.05, "loc = {}", fit.loc);
        assert!((mean - 1.0).abs() > 1.0);
    }

    #[test]
    fn test_converges_to_center_for_heavy_tails() {
        let mut rng = StdRng::seed_from_u64(42);
        let t = StudentT::new(3.0).unwrap();
        let center = -1250.0;
        let spread = 40.0;

        let mut errors = Vec::new();
        for &n in &[200usize, 20_000] {
            let samples: Vec<f64> = (0..n).map(|_| center + spread * t.sample(&mut rng)).collect();
            let fit = fit_student_t(&samples).unwrap();
            errors.push((fit.loc - center).abs());
            if n == 20_000 {
                assert!((fit.df - 3.0).abs() < 0.6, "df = {}", fit.df);
                assert!((fit.scale - spread).abs() < 2.0, "scale = {}", fit.scale);
            }
        }
        assert!(errors[1] < 1.5, "large-sample error {}", errors[1]);
        assert!(errors[0] < 12.0, "small-sample error {}", errors[0]);
    }

    #[test]
    fn test_gaussian_samples_push_df_up() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Normal::new(300.0, 5.0).unwrap();
        let samples: Vec<f64> = (0..20_000).map(|_| normal.sample(&mut rng)).collect();
        let fit = fit_student_t(&samples).unwrap();
        assert!((fit.loc - 300.0).abs() < 0.2);
        assert!(fit.df > 20.0, "df = {}", fit.df);
    }
}
