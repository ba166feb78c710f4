use syntax::TextRange;

use crate::cascade;
use crate::color::{Color, parse_color};
use crate::file_system::FilePath;
use crate::index::Index;

#[derive(Debug, Clone, PartialEq)]
pub struct ColorInformation {
    pub range: TextRange,
    pub color: Color,
}

pub fn exec(index: &Index, file: &FilePath) -> Vec<ColorInformation> {
    let definitions = index
        .definitions_in(file)
        .into_iter()
        .filter_map(|definition| {
            Some(ColorInformation {
                range: definition.value_range,
                color: parse_color(&definition.value)?,
            })
        });
    let usages = index.usages_in(file).into_iter().filter_map(|usage| {
        let color = cascade::resolve_color(index, &usage.name).or_else(|| {
            let fallback = usage.fallback.as_deref()?;
            cascade::resolve_value_color(index, fallback)
        })?;
        Some(ColorInformation {
            range: usage.range,
            color,
        })
    });

    let mut colors: Vec<_> = definitions.chain(usages).collect();
    colors.sort_by_key(|it| it.range.start());
    colors
}

#[cfg(test)]
mod tests {
    use crate::color::{ColorFormat, format_color};
    use crate::tests;

    fn check(fixture: &str) -> Vec<(String, String)> {
        let (host, f) = tests::multiple_files(fixture);
        let file = f.root_file();
        super::exec(host.index(), &file)
            .into_iter()
            .map(|it| {
                let text = f.file_content(&file)[it.range].to_string();
                (text, format_color(&it.color, ColorFormat::Hex))
            })
            .collect()
    }

    #[test]
    fn definitions_and_usages() {
        let colors = check(
            r#"
; /a.css
:root { --brand: rebeccapurple; --gap: 4px; --link: var(--brand); }
a { color: var(--link); margin: var(--gap); border-color: var(--other, #fff); }
"#,
        );
        assert_eq!(
            colors,
            vec![
                ("rebeccapurple".to_string(), "#663399".to_string()),
                ("var(--brand)".to_string(), "#663399".to_string()),
                ("var(--link)".to_string(), "#663399".to_string()),
                ("var(--other, #fff)".to_string(), "#ffffff".to_string()),
            ]
        );
    }

    #[test]
    fn usages_resolve_across_files() {
        let colors = check(
            r#"
; /index.html
<p style="color: var(--fg)"></p>
; /theme.css
:root { --fg: #000; }
"#,
        );
        assert_eq!(
            colors,
            vec![("var(--fg)".to_string(), "#000000".to_string())]
        );
    }
}
