//! # 立方晶体导出模量
//!
//! ```text
//! B       = (C11 + 2·C12) / 3
//! G_V     = (C11 − C12 + 3·C44) / 5
//! G_R     = 5·(C11 − C12)·C44 / (3·(C11 − C12) + 4·C44)
//! E_{V,R} = 9·B·G / (3·B + G)
//! ν_{V,R} = (3·B − G) / (2·(3·B + G))
//! ```
//!
//! 分母为零（如 C11 = C12 且 C44 = 0）时对应模量记为无定义，其余照常给出。
//!
//! ## 依赖关系
//! - 被 `sweep/`, `commands/moduli.rs` 使用
//! - 使用 `models/elastic.rs`

use crate::models::{ElasticConstantSet, ModuliSet};

/// 由弹性常数计算导出模量
pub fn derive_moduli(c: &ElasticConstantSet) -> ModuliSet {
    let bulk = c.c11.zip(c.c12).map(|(c11, c12)| (c11 + 2.0 * c12) / 3.0);

    let shear_voigt = c
        .c11
        .zip(c.c12)
        .zip(c.c44)
        .map(|((c11, c12), c44)| (c11 - c12 + 3.0 * c44) / 5.0);

    let shear_reuss = c.c11.zip(c.c12).zip(c.c44).and_then(|((c11, c12), c44)| {
        let d = c11 - c12;
        ratio(5.0 * d * c44, 3.0 * d + 4.0 * c44)
    });

    let young = |g: Option<f64>| bulk.zip(g).and_then(|(b, g)| ratio(9.0 * b * g, 3.0 * b + g));
    let poisson =
        |g: Option<f64>| bulk.zip(g).and_then(|(b, g)| ratio(3.0 * b - g, 2.0 * (3.0 * b + g)));

    ModuliSet {
        bulk,
        shear_voigt,
        shear_reuss,
        young_voigt: young(shear_voigt),
        young_reuss: young(shear_reuss),
        poisson_voigt: poisson(shear_voigt),
        poisson_reuss: poisson(shear_reuss),
    }
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    let r = num / den;
    (den != 0.0 && r.is_finite()).then_some(r)
}
