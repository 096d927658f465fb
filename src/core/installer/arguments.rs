use std::collections::HashMap;

/// Values for `${name}` placeholders in launch arguments.
pub type Placeholders<'a> = HashMap<&'static str, &'a str>;

/// Resolve every placeholder in `raw`. An argument that still references an
/// unknown placeholder is dropped. When it is a bare value, the option flag
/// that introduced it goes too; a self-contained `-Dkey=${..}` form drops alone.
pub fn substitute_args(raw: &[String], values: &Placeholders<'_>) -> Vec<String> {
    let mut resolved = Vec::with_capacity(raw.len());
    for arg in raw {
        match substitute(arg, values) {
            Some(value) => resolved.push(value),
            None if is_option(arg) => {}
            None => drop_dangling_option(&mut resolved),
        }
    }
    resolved
}

fn substitute(arg: &str, values: &Placeholders<'_>) -> Option<String> {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}')?;
        let value = values.get(&after[..end])?;
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Some(out)
}

fn is_option(arg: &str) -> bool {
    arg.starts_with('-')
}

fn drop_dangling_option(args: &mut Vec<String>) {
    if args.last().is_some_and(|last| is_option(last)) {
        let _ = args.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_known_placeholders() {
        let values = Placeholders::from([
            ("auth_player_name", "Steve"),
            ("natives_directory", "/n"),
            ("user_type", "msa"),
        ]);
        let out = substitute_args(
            &args(&[
                "--username",
                "${auth_player_name}",
                "-Djava.library.path=${natives_directory}",
                "--userType",
                "${user_type}",
            ]),
            &values,
        );
        assert_eq!(
            out,
            args(&[
                "--username",
                "Steve",
                "-Djava.library.path=/n",
                "--userType",
                "msa"
            ])
        );
    }

    #[test]
    fn unresolved_placeholder_drops_its_flag() {
        let values = Placeholders::from([("auth_player_name", "Steve")]);
        let out = substitute_args(
            &args(&[
                "--username",
                "${auth_player_name}",
                "--quickPlayPath",
                "${quickPlayPath}",
                "--demo-less",
            ]),
            &values,
        );
        assert_eq!(out, args(&["--username", "Steve", "--demo-less"]));
    }

    #[test]
    fn unresolved_option_drops_only_itself() {
        let values = Placeholders::from([("natives_directory", "/n")]);
        let out = substitute_args(
            &args(&[
                "-Xss1M",
                "-Dfoo=${unknown_thing}",
                "-Djava.library.path=${natives_directory}",
                "--width",
                "--height=${resolution_height}",
            ]),
            &values,
        );
        assert_eq!(out, args(&["-Xss1M", "-Djava.library.path=/n", "--width"]));
    }

    #[test]
    fn unterminated_placeholder_is_unresolved() {
        let values = Placeholders::new();
        assert!(substitute_args(&args(&["${broken"]), &values).is_empty());
        assert_eq!(substitute_args(&args(&["plain"]), &values), args(&["plain"]));
    }

    #[test]
    fn multiple_placeholders_in_one_argument() {
        let values = Placeholders::from([("a", "1"), ("b", "2")]);
        assert_eq!(
            substitute_args(&args(&["${a}:${b}"]), &values),
            args(&["1:2"])
        );
    }
}
