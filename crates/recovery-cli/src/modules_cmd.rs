//! CLI handler for `recovery-plan modules`.

use anyhow::Result;

use recovery_core::ModuleType;
use recovery_core::library::{builtin_modules, module_ids_by_type};

const TYPE_ORDER: [ModuleType; 5] = [
    ModuleType::Task,
    ModuleType::Tracking,
    ModuleType::Education,
    ModuleType::Milestone,
    ModuleType::RedFlag,
];

/// List the built-in module library grouped by module type, optionally
/// restricted to one type.
pub fn run_modules(only: Option<ModuleType>) -> Result<()> {
    let modules = builtin_modules();
    let id_w = modules.keys().map(String::len).max().unwrap_or(2).max(2);
    let type_w = "red_flag".len();

    println!("{:<id_w$}  {:<type_w$}  {:<8}  TITLE", "ID", "TYPE", "SEVERITY");
    for kind in TYPE_ORDER.into_iter().filter(|k| only.is_none_or(|o| o == *k)) {
        for id in module_ids_by_type(kind) {
            let Some(module) = modules.get(&id) else {
                continue;
            };
            let severity = module
                .severity
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_owned());
            println!(
                "{:<id_w$}  {:<type_w$}  {:<8}  {}",
                module.id,
                module.kind.as_str(),
                severity,
                module.title,
            );
        }
    }
    Ok(())
}
