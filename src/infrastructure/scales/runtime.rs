//! Lua runtime wrapper
//!
//! Every compiled scale owns its own `Lua` state. Only the pure standard
//! libraries are opened: no `io`, `os`, `package` or `debug`.

use mlua::{Function, Lua, LuaOptions, StdLib, Value};

use crate::application::errors::ScaleError;

/// Global function every scale must define
pub const ENTRY_POINT: &str = "plugin";

/// Memory cap for a single scale's Lua state
const MEMORY_LIMIT: usize = 16 * 1024 * 1024;

/// A loaded, ready to call scale script
pub struct ScriptRuntime {
    lua: Lua,
}

impl ScriptRuntime {
    /// Load `source` into a fresh Lua state and check that it defines the entry point
    pub fn compile(name: &str, source: &str) -> Result<Self, ScaleError> {
        let load_err = |e: mlua::Error| ScaleError::Load {
            name: name.to_string(),
            message: e.to_string(),
        };

        let libs = StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::UTF8 | StdLib::COROUTINE;
        let lua = Lua::new_with(libs, LuaOptions::default()).map_err(load_err)?;
        lua.set_memory_limit(MEMORY_LIMIT).map_err(load_err)?;

        lua.load(source)
            .set_name(format!("={}", name))
            .exec()
            .map_err(load_err)?;

        match lua.globals().get::<Value>(ENTRY_POINT) {
            Ok(Value::Function(_)) => Ok(Self { lua }),
            _ => Err(ScaleError::MissingEntryPoint(name.to_string())),
        }
    }

    /// Call the entry point and flatten its result into reply strings
    pub fn invoke(&self, name: &str, is_indicated: bool, argument_text: &str) -> Result<Vec<String>, ScaleError> {
        let runtime_err = |e: mlua::Error| ScaleError::Runtime {
            name: name.to_string(),
            message: e.to_string(),
        };

        let entry: Function = self.lua.globals().get(ENTRY_POINT).map_err(runtime_err)?;
        let result: Value = entry.call((is_indicated, argument_text)).map_err(runtime_err)?;

        normalize(&self.lua, result).map_err(runtime_err)
    }
}

/// nil -> nothing, table -> one string per element, anything else -> one string
fn normalize(lua: &Lua, value: Value) -> mlua::Result<Vec<String>> {
    let Value::Table(table) = value else {
        return Ok(to_text(lua, value)?.into_iter().collect());
    };

    let mut output = Vec::new();
    let len = table.raw_len();

    // Holes inside the sequence are skipped rather than ending it
    for i in 1..=len {
        output.extend(to_text(lua, table.raw_get::<Value>(i)?)?);
    }

    // Entries outside the sequence part, in traversal order
    for pair in table.pairs::<Value, Value>() {
        let (key, item) = pair?;
        if let Value::Integer(i) = key {
            if i >= 1 && (i as usize) <= len {
                continue;
            }
        }
        output.extend(to_text(lua, item)?);
    }

    Ok(output)
}

fn to_text(lua: &Lua, value: Value) -> mlua::Result<Option<String>> {
    match value {
        Value::Nil => Ok(None),
        Value::String(s) => Ok(Some(s.to_string_lossy().to_string())),
        other => {
            let tostring: Function = lua.globals().get("tostring")?;
            Ok(Some(tostring.call::<String>(other)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, is_indicated: bool, args: &str) -> Vec<String> {
        ScriptRuntime::compile("test", source)
            .unwrap()
            .invoke("test", is_indicated, args)
            .unwrap()
    }

    #[test]
    fn test_scalar_return() {
        assert_eq!(run("function plugin(p, m) return 'hiss' end", false, ""), vec!["hiss"]);
        assert_eq!(run("function plugin(p, m) return 42 end", false, ""), vec!["42"]);
        assert_eq!(run("function plugin(p, m) return p end", true, ""), vec!["true"]);
    }

    #[test]
    fn test_nil_return() {
        assert!(run("function plugin(p, m) end", false, "").is_empty());
    }

    #[test]
    fn test_table_return_keeps_order() {
        let out = run("function plugin(p, m) return { 'a', 2, m } end", false, "c");
        assert_eq!(out, vec!["a", "2", "c"]);
    }

    #[test]
    fn test_table_with_holes_keeps_later_elements() {
        let out = run("function plugin(p, m) return { 'a', nil, 'c' } end", false, "");
        assert_eq!(out, vec!["a", "c"]);

        let out = run("function plugin(p, m) local t = { 'a' }; t[3] = 'c'; return t end", false, "");
        assert_eq!(out, vec!["a", "c"]);
    }

    #[test]
    fn test_table_named_entries_follow_sequence() {
        let out = run("function plugin(p, m) return { 'a', greeting = 'hi', 'b' } end", false, "");
        assert_eq!(out, vec!["a", "b", "hi"]);
    }

    #[test]
    fn test_nested_table_is_one_string() {
        let out = run("function plugin(p, m) return { 'a', { 'x', 'y' }, true } end", false, "");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], "a");
        assert!(out[1].starts_with("table:"), "{}", out[1]);
        assert_eq!(out[2], "true");
    }

    #[test]
    fn test_arguments_are_passed() {
        let source = r#"
            function plugin(prefixed, msg)
                if prefixed then return "!" .. msg end
                return msg
            end
        "#;
        assert_eq!(run(source, true, "snoot"), vec!["!snoot"]);
        assert_eq!(run(source, false, "snoot"), vec!["snoot"]);
    }

    #[test]
    fn test_syntax_error_is_load_error() {
        match ScriptRuntime::compile("broken", "function plugin(") {
            Err(ScaleError::Load { name, message }) => {
                assert_eq!(name, "broken");
                assert!(!message.is_empty());
            }
            other => panic!("expected load error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_missing_entry_point() {
        assert!(matches!(
            ScriptRuntime::compile("empty", "x = 1"),
            Err(ScaleError::MissingEntryPoint(_))
        ));
    }

    #[test]
    fn test_runtime_error_is_caught() {
        let runtime = ScriptRuntime::compile("boom", "function plugin(p, m) error('nope') end").unwrap();
        match runtime.invoke("boom", false, "") {
            Err(ScaleError::Runtime { message, .. }) => assert!(message.contains("nope")),
            other => panic!("expected runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_unsafe_libraries_are_absent() {
        let out = run("function plugin(p, m) return tostring(os) .. tostring(io) end", false, "");
        assert_eq!(out, vec!["nilnil"]);
    }
}
