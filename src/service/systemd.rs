//! systemd user units

pub struct Unit<'a> {
    pub description: &'a str,
    pub exec_start: &'a [String],
}

pub fn render_unit(unit: &Unit<'_>) -> String {
    let exec = unit
        .exec_start
        .iter()
        .map(|arg| quote(arg))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "[Unit]\n\
         Description={}\n\
         \n\
         [Service]\n\
         ExecStart={exec}\n\
         Restart=on-failure\n\
         \n\
         [Install]\n\
         WantedBy=default.target\n",
        unit.description
    )
}

/// Quote one `ExecStart` word.
///
/// Words without whitespace, quotes or backslashes pass through. `%` is always
/// doubled since systemd expands specifiers inside quotes too.
pub fn quote(arg: &str) -> String {
    let arg = arg.replace('%', "%%");
    let plain = !arg.is_empty()
        && !arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ';' | '$'));
    if plain {
        return arg;
    }

    let mut out = String::from("\"");
    for c in arg.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '$' => out.push_str("$$"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
