//! # moduli 命令实现
//!
//! 读取任意 `T,C11,C12,C44` 常数文件，重写七个导出模量文件。
//!
//! ## 依赖关系
//! - 使用 `cli/results.rs` 定义的参数
//! - 使用 `sweep/orchestrator.rs` 的 `rewrite_moduli`
//! - 使用 `utils/output.rs`

use crate::cli::results::ModuliArgs;
use crate::error::{ElasticError, Result};
use crate::sweep::rewrite_moduli;
use crate::utils::output;

use std::fs;
use std::path::Path;

/// 执行 moduli 命令
pub fn execute(args: ModuliArgs) -> Result<()> {
    output::print_header("Derived Moduli");

    if !args.input.exists() {
        return Err(ElasticError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    let dir = match &args.output_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|e| ElasticError::write(dir, e))?;
            dir.clone()
        }
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let written = rewrite_moduli(&args.input, &dir)?;
    for path in &written {
        output::print_success(&format!("Wrote '{}'", path.display()));
    }
    output::print_done(&format!(
        "{} moduli files rewritten from '{}'",
        written.len(),
        args.input.display()
    ));
    Ok(())
}
