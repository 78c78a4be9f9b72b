//! Built-in `scale` commands - managing scales from chat
//!
//! These are the only hardcoded commands. They run when a message is
//! indicated and its verb is `scale` or `scales`, and they cannot be
//! shadowed by a user scale of the same name.

use crate::domain::entities::command::split_first_word;
use crate::infrastructure::scales::{extract_source, normalize_name, Scale, ScaleRegistry, ScriptRuntime};

/// Verbs that route to the built-in commands
pub const SCALE_KEYWORDS: [&str; 2] = ["scale", "scales"];

pub fn is_scale_keyword(verb: &str) -> bool {
    SCALE_KEYWORDS.contains(&verb)
}

/// Result of a built-in command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinReply {
    Text(String),
    Shutdown,
}

/// Runs built-in scale commands against one bot's registry
pub struct ScaleAdmin<'a> {
    registry: &'a mut ScaleRegistry,
    indicator: &'a str,
    bot_name: &'a str,
}

impl<'a> ScaleAdmin<'a> {
    pub fn new(registry: &'a mut ScaleRegistry, indicator: &'a str, bot_name: &'a str) -> Self {
        Self {
            registry,
            indicator,
            bot_name,
        }
    }

    /// Run `<sub-verb> <sub-arguments>`
    pub fn run(&mut self, argument_text: &str) -> BuiltinReply {
        let (sub_verb, sub_args) = split_first_word(argument_text);
        let sub_verb = sub_verb.to_lowercase();

        let text = match sub_verb.as_str() {
            "help" | "guide" | "how" | "howto" | "new" | "?" => self.help(),
            "list" => self.list(),
            "type" | "cat" | "print" | "dump" => self.print(&sub_verb, sub_args),
            "add" => self.add(sub_args),
            "update" => self.update(sub_args),
            "remove" => self.remove(sub_args),
            "shutdown" => {
                tracing::warn!("Shutdown requested through chat");
                return BuiltinReply::Shutdown;
            }
            _ => self.usage(),
        };

        BuiltinReply::Text(text)
    }

    fn help(&self) -> String {
        let i = self.indicator;
        let mut text = format!(
            "To add a new scale, you'll want to make sure you use the `{i}scale add <name>` command.\n"
        );
        text.push_str("Here's some boilerplate for adding a new scale that you can copy and paste!\n");
        text.push_str(&format!("` {i}scale add Poke`\n"));
        text.push_str("```lua\n");
        text.push_str("-- Since this is named Poke, 'poke' is the required command word. It's case insensitive.\n");
        text.push_str(&format!("-- 'prefixed' is true when the message started with {i}\n"));
        text.push_str("function plugin(prefixed, msg)\n");
        text.push_str("\tif msg == \"snoot\" then\n");
        text.push_str("\t\treturn \"blep\"\n");
        text.push_str("\telse\n");
        text.push_str("\t\treturn \"hiss\"\n");
        text.push_str("\tend\n");
        text.push_str("end\n");
        text.push_str("```\n");
        text.push_str("Return a table to send several messages, or nothing to stay quiet.");
        text
    }

    fn list(&self) -> String {
        let i = self.indicator;
        let count = self.registry.len();
        if count == 0 {
            return format!("I only have my default scales! Try adding some with `{i}scale add <name> <content>`!");
        }

        let mut text = format!("Found {} {}: ```diff", count, plural(count));
        for scale in self.registry.iter() {
            // Scales that have never loaded show up red
            let marker = if scale.is_loaded() { "+" } else { "-" };
            text.push_str(&format!("\n{} {}", marker, scale.name()));
        }
        text.push_str("\n```");
        text.push_str(&format!(
            "\nYou can add and remove scales with `{i}scale add <name> <content>` and `{i}scale remove <name>`"
        ));
        text
    }

    fn print(&self, sub_verb: &str, args: &str) -> String {
        let i = self.indicator;
        if args.is_empty() {
            return format!(
                "I can't print out nothing! Try specifying a scale by name, like `{i}scale {sub_verb} <name>`!"
            );
        }

        let Some(scale) = normalize_name(args).and_then(|name| self.registry.find(&name)) else {
            return not_found(args);
        };

        match scale.source() {
            Ok(source) => {
                let newline = if source.ends_with('\n') { "" } else { "\n" };
                format!("```lua\n{}{}```", source, newline)
            }
            Err(e) => {
                tracing::warn!("Failed to read scale '{}': {}", scale.name(), e);
                not_found(args)
            }
        }
    }

    fn add(&mut self, args: &str) -> String {
        let i = self.indicator;
        let Some(source) = extract_source(args) else {
            return format!(
                "Nothing to add! Put the code in a code block after the name, like `{i}scale add poke ```lua ...````. Try `{i}scale guide`!"
            );
        };
        let Some(name) = normalize_name(&source.name) else {
            return format!("I need a simple name for that scale, like `{i}scale add poke <content>`!");
        };

        let path = self.registry.path_for(&name);
        if self.registry.find(&name).is_some() || path.exists() {
            return format!(
                "There's already a scale named `{name}`! Use `{i}scale update {name} <content>` to change it."
            );
        }

        if let Err(e) = ScriptRuntime::compile(&name, &source.body) {
            return compile_error(&e.detail());
        }

        if let Err(e) = std::fs::write(&path, &source.body) {
            tracing::warn!("Failed to write scale {}: {}", path.display(), e);
            return format!("Hmm, I couldn't make that into a scale...\n{}", e);
        }

        self.registry.insert(Scale::load(&path));
        tracing::info!("Added scale '{}'", name);

        let count = self.registry.len();
        format!(
            "A scale named `{}` was created! {} currently has {} {}!",
            name,
            self.bot_name,
            count,
            plural(count)
        )
    }

    fn update(&mut self, args: &str) -> String {
        let i = self.indicator;
        let Some(source) = extract_source(args) else {
            return format!("Nothing to update! Try `{i}scale update <name> <content>`!");
        };
        let Some(name) = normalize_name(&source.name) else {
            return format!("I need a simple name for that scale, like `{i}scale update poke <content>`!");
        };

        let path = self
            .registry
            .find(&name)
            .map(|scale| scale.path().to_path_buf())
            .unwrap_or_else(|| self.registry.path_for(&name));
        if !path.is_file() {
            return format!("I couldn't find a scale named `{name}` to update! Try `{i}scale add` instead.");
        }

        if let Err(e) = ScriptRuntime::compile(&name, &source.body) {
            return compile_error(&e.detail());
        }

        if let Err(e) = std::fs::write(&path, &source.body) {
            tracing::warn!("Failed to write scale {}: {}", path.display(), e);
            return format!("Hmm, I couldn't update that scale...\n{}", e);
        }

        tracing::info!("Updated scale '{}'", name);
        format!("The scale `{name}` was updated! The new version takes effect with the next message.")
    }

    fn remove(&mut self, args: &str) -> String {
        let i = self.indicator;
        if args.is_empty() {
            return format!(
                "Whoops - That's not how you remove scales! Remember to specify a scale name! `{i}scale remove <name>`!"
            );
        }
        let Some(name) = normalize_name(args) else {
            return not_found(args);
        };

        let Some(path) = self.registry.find(&name).map(|s| s.path().to_path_buf()) else {
            let path = self.registry.path_for(&name);
            if path.exists() {
                return format!(
                    "Hmm, I found something at {}, but it doesn't seem to be a scale so I won't delete it.",
                    path.display()
                );
            }
            return not_found(args);
        };

        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to delete scale {}: {}", path.display(), e);
                return format!("Hmm, I couldn't delete that scale...\n{}", e);
            }
        }

        self.registry.remove(&name);
        tracing::info!("Removed scale '{}'", name);
        format!(
            "I deleted my scale at `{}`!\nCustom scales left: {}",
            path.display(),
            self.registry.len()
        )
    }

    fn usage(&self) -> String {
        let i = self.indicator;
        format!(
            "To look at {}'s scales, try `{i}scale list`! \
             Other commands: `help`, `type <name>`, `add <name> <content>`, `update <name> <content>`, `remove <name>`.",
            self.bot_name
        )
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "scale"
    } else {
        "scales"
    }
}

fn not_found(name: &str) -> String {
    format!("I couldn't find a scale with the name `{}`!", name.trim())
}

fn compile_error(detail: &str) -> String {
    format!(
        "Whoops, looks like there was an error in that code - I can't add that as a scale until it compiles!\n`{}`",
        detail
    )
}
