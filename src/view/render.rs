use std::fmt::Write;

use super::state::ViewState;
use crate::catalog::Movie;

const HEADLINE: &str = "Encontre filmes que você vai gostar sem complicações";
const PLACEHOLDER: &str = "Procure dentre milhares de filmes";
const LOADING: &str = "Carregando...";

pub fn render_html(state: &ViewState, image_base: &str) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head><meta charset=\"utf-8\"><title>cinebusca</title></head>\n<body>\n<main>\n<div class=\"wrapper\">\n");
    let _ = writeln!(html, "<header><h1>{}</h1>", escape(HEADLINE));
    let _ = writeln!(
        html,
        "<form class=\"search\" method=\"get\" action=\"/\"><input type=\"text\" name=\"query\" placeholder=\"{}\" value=\"{}\"></form>",
        escape(PLACEHOLDER),
        escape(&state.query)
    );
    html.push_str("</header>\n");

    if !state.trending.is_empty() {
        html.push_str("<section class=\"trending\">\n<h2>Em alta</h2>\n<ol>\n");
        for (rank, counter) in state.trending.iter().enumerate() {
            let _ = writeln!(
                html,
                "<li><p>{}</p><img src=\"{}\" alt=\"{}\"></li>",
                rank + 1,
                escape(&counter.poster_url),
                escape(&counter.searchterm)
            );
        }
        html.push_str("</ol>\n</section>\n");
    }

    html.push_str("<section class=\"all-movies\">\n<h2>Todos os filmes</h2>\n");
    if state.is_loading {
        let _ = writeln!(html, "<div class=\"spinner\" role=\"status\">{}</div>", LOADING);
    } else if let Some(ref message) = state.error_message {
        let _ = writeln!(html, "<p class=\"error\">{}</p>", escape(message));
    } else {
        html.push_str("<ul>\n");
        for movie in &state.movies {
            html.push_str(&movie_card_html(movie, image_base));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</section>\n</div>\n</main>\n</body>\n</html>\n");

    html
}

fn movie_card_html(movie: &Movie, image_base: &str) -> String {
    let poster = movie
        .poster_url(image_base)
        .unwrap_or_else(|| "/no-movie.png".to_string());

    format!(
        "<li class=\"movie-card\"><img src=\"{}\" alt=\"{}\"><h3>{}</h3><div class=\"content\"><span class=\"rating\">{}</span> <span class=\"lang\">{}</span> <span class=\"year\">{}</span></div></li>\n",
        escape(&poster),
        escape(&movie.title),
        escape(&movie.title),
        rating(movie),
        escape(movie.original_language().unwrap_or("")),
        escape(movie.release_year().unwrap_or("N/A")),
    )
}

pub fn render_text(state: &ViewState) -> String {
    let mut text = String::new();

    let _ = writeln!(text, "{}", HEADLINE);
    if state.query.is_empty() {
        let _ = writeln!(text, "> ({})", PLACEHOLDER);
    } else {
        let _ = writeln!(text, "> {}", state.query);
    }

    if !state.trending.is_empty() {
        text.push_str("\nEm alta:\n");
        for (rank, counter) in state.trending.iter().enumerate() {
            let _ = writeln!(text, "  {}. {}", rank + 1, counter.searchterm);
        }
    }

    text.push_str("\nTodos os filmes:\n");
    if state.is_loading {
        let _ = writeln!(text, "  {}", LOADING);
    } else if let Some(ref message) = state.error_message {
        let _ = writeln!(text, "  ! {}", message);
    } else if state.movies.is_empty() {
        text.push_str("  (nenhum filme)\n");
    } else {
        for movie in &state.movies {
            let year = movie.release_year().unwrap_or("N/A");
            let _ = write!(text, "  - {} ({}) ★ {}", movie.title, year, rating(movie));
            if let Some(lang) = movie.original_language() {
                let _ = write!(text, " · {}", lang);
            }
            text.push('\n');
        }
    }

    text
}

fn rating(movie: &Movie) -> String {
    movie
        .vote_average()
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "N/A".to_string())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
