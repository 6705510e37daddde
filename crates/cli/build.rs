use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let search = clap::Command::new("search")
        .about("Search the web and optionally fetch each result's article")
        .arg(clap::arg!(<QUERY> "Search query"))
        .arg(
            clap::arg!(-e --engine <ENGINE> "Query only this engine instead of falling back in order")
                .value_parser(["serper", "serpapi"]),
        )
        .arg(clap::arg!(-f --fetch_content "Replace snippets with extracted article text"))
        .arg(clap::arg!(-n --num <NUM> "Number of results").default_value("10"))
        .arg(clap::arg!(--json "Print the response as JSON"));

    let extract = clap::Command::new("extract")
        .about("Extract the article from a URL, a local HTML file, or '-' for stdin")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(clap::arg!(--max_length <NUM> "Maximum characters of content kept").default_value("3000"))
        .arg(clap::arg!(--no_follow "Do not follow listing pages to their first article"))
        .arg(clap::arg!(--json "Print the outcome as JSON"));

    let mut cmd = clap::Command::new("gleaner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Search the web and extract article content")
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .arg(clap::arg!(--timeout <SECS> "Page fetch timeout in seconds").global(true))
        .subcommand(search)
        .subcommand(extract);

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "gleaner", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "gleaner", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "gleaner", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "gleaner", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
