use std::io::{Result, Write};

use colorpick::pipeline::{Exemplar, Options};
use prettytty::cmd::{DynSetForeground24, ResetStyle};

use crate::cli::CommandLineArguments;

/// Write the effective settings.
pub fn write_settings<W: Write>(
    out: &mut W,
    args: &CommandLineArguments,
    options: &Options,
) -> Result<()> {
    writeln!(out, "settings are:")?;
    writeln!(out, "    color corpus:      {}", args.color_corpus.display())?;
    writeln!(out, "    corpus name:       {}", args.color_corpus_name)?;
    writeln!(out, "    random seed:       {}", options.seed())?;
    writeln!(out, "    number of colors:  {}", options.clusters())?;
    writeln!(out, "    cluster by:        {}", options.cluster_by())?;
    writeln!(out, "    choose by:         {}", options.strategy())?;
    writeln!(out, "    sort by:           {}", options.sort_by())?;
    if let Some(path) = &args.output_color_palette {
        writeln!(out, "    palette:           {}", path.display())?;
    }
    Ok(())
}

/// Write the chosen colors as a table.
///
/// With color enabled, the hex code in the last column is shown in its own
/// color.
pub fn write_table<W: Write>(out: &mut W, exemplars: &[Exemplar], colorful: bool) -> Result<()> {
    let width = exemplars
        .iter()
        .map(|e| e.name().chars().count())
        .max()
        .unwrap_or(0)
        .max("colorname".len());

    writeln!(out, "chosen colors are:")?;
    writeln!(
        out,
        "{:>3}  {:<width$}  {:>7} {:>7} {:>7}  {:>5} {:>5} {:>5}  rgb",
        "",
        "colorname",
        "lab_l",
        "lab_a",
        "lab_b",
        "hsl_h",
        "hsl_s",
        "hsl_l",
        width = width
    )?;

    for (row, exemplar) in exemplars.iter().enumerate() {
        let [l, a, b] = *exemplar.lab();
        let [h, s, hl] = *exemplar.hsl();
        write!(
            out,
            "{:>3}  {:<width$}  {:>7.2} {:>7.2} {:>7.2}  {:>5.3} {:>5.3} {:>5.3}  ",
            row,
            exemplar.name(),
            l,
            a,
            b,
            h,
            s,
            hl,
            width = width
        )?;

        let rgb = exemplar.rgb();
        if colorful {
            let [r, g, b] = rgb.coordinates();
            writeln!(out, "{}{}{}", DynSetForeground24(r, g, b), rgb, ResetStyle)?;
        } else {
            writeln!(out, "{}", rgb)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::{write_settings, write_table};
    use crate::cli::CommandLineArguments;
    use clap::Parser;
    use colorpick::pipeline::{run, Options};
    use colorpick::Corpus;

    fn render(colorful: bool) -> Result<String, Box<dyn std::error::Error>> {
        let corpus = Corpus::parse(
            "black: \"#000000\"\n\
             white: \"#ffffff\"\n\
             tomato: \"#ff6347\"\n",
        )?;
        let options = Options::builder().clusters(3).build()?;
        let outcome = run(&corpus, &options, &options.kmeans())?;

        let mut buffer = Vec::new();
        write_table(&mut buffer, outcome.exemplars(), colorful)?;
        Ok(String::from_utf8(buffer)?)
    }

    #[test]
    fn test_table() -> Result<(), Box<dyn std::error::Error>> {
        let plain = render(false)?;
        let lines: Vec<_> = plain.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("colorname"));
        assert!(lines[2].contains("black"));
        assert!(lines[2].ends_with("#000000"));
        assert!(lines[4].contains("white"));
        assert!(!plain.contains('\x1b'));

        let colorful = render(true)?;
        assert!(colorful.contains("\x1b[38;2;255;99;71m#ff6347\x1b[m"));
        Ok(())
    }

    #[test]
    fn test_settings() -> Result<(), Box<dyn std::error::Error>> {
        let args = CommandLineArguments::try_parse_from(["colorpick", "-i", "colors.txt"])?;
        let options = args.options()?;

        let mut buffer = Vec::new();
        write_settings(&mut buffer, &args, &options)?;
        let text = String::from_utf8(buffer)?;
        assert!(text.contains("colors.txt"));
        assert!(text.contains("choose by:         hsl_s0"));
        assert!(!text.contains("palette:"));
        Ok(())
    }
}
