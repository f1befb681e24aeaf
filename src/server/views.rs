// HTML rendering for the two views.
//
// Pure functions from data to markup; every feed-derived string passes
// through `escape` on the way out.

use crate::lineup::Lineup;
use crate::pool::filter::TimeFilter;
use crate::pool::{display_positions, PlayerRow};
use crate::server::session::FilterState;

/// Escape text for interpolation into HTML.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 2em; }}\n\
         table {{ border-collapse: collapse; margin: 1em 0; }}\n\
         th, td {{ border: 1px solid #ccc; padding: 4px 8px; text-align: left; }}\n\
         .controls {{ margin: 1em 0; }}\n\
         .controls label {{ margin-right: 1em; }}\n\
         </style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

fn selected_if(condition: bool) -> &'static str {
    if condition {
        " selected"
    } else {
        ""
    }
}

fn checked_if(condition: bool) -> &'static str {
    if condition {
        " checked"
    } else {
        ""
    }
}

/// The player pool view: the filtered table plus the selection form.
pub fn player_pool_page(
    rows: &[PlayerRow],
    teams: &[String],
    state: &FilterState,
) -> String {
    let mut body = String::new();
    body.push_str("<h1>Player Pool</h1>\n<form method=\"post\" action=\"/\">\n");

    body.push_str("<div class=\"controls\">\n");
    body.push_str(&format!(
        "<label>Lineups <input type=\"number\" name=\"num_lineups\" min=\"1\" value=\"{}\"></label>\n",
        state.num_lineups
    ));

    body.push_str("<label>Games <select name=\"time_filter\">\n");
    for filter in [TimeFilter::All, TimeFilter::OnePm, TimeFilter::Late] {
        body.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            filter.as_str(),
            selected_if(state.time_filter == filter),
            filter.as_str()
        ));
    }
    body.push_str("</select></label>\n");

    body.push_str("<label>Stack <select name=\"stack_team\">\n<option value=\"\"></option>\n");
    for team in teams {
        body.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            escape(team),
            selected_if(state.stack_team.as_deref() == Some(team.as_str())),
            escape(team)
        ));
    }
    body.push_str("</select></label>\n");
    body.push_str("<button type=\"submit\">Build Lineups</button>\n</div>\n");

    body.push_str(
        "<table>\n<tr><th>Lock</th><th>Exclude</th><th>Name</th><th>Pos</th><th>Team</th>\
         <th>Opp</th><th>Salary</th><th>Proj</th><th>Adj Proj</th><th>DVP</th><th>Value</th>\
         <th>L5 Avg</th><th>L10 Avg</th><th>Szn Avg</th><th>O/U</th><th>Tm Pts</th>\
         <th>Own %</th><th>Game Time</th></tr>\n",
    );
    for row in rows {
        let id = escape(&row.unique_id);
        body.push_str(&format!(
            "<tr>\
             <td><input type=\"checkbox\" name=\"lock_player\" value=\"{id}\"{}></td>\
             <td><input type=\"checkbox\" name=\"exclude_player\" value=\"{id}\"{}></td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td>\
             <td>{:.2}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            checked_if(state.locked_ids.contains(&row.unique_id)),
            checked_if(state.excluded_ids.contains(&row.unique_id)),
            escape(&row.name),
            escape(&display_positions(&row.positions)),
            escape(&row.team),
            escape(&row.opponent),
            row.salary,
            row.final_projection,
            row.adjusted_projection,
            escape(&row.dvp),
            escape(&row.value),
            escape(&row.l5_avg),
            escape(&row.l10_avg),
            escape(&row.season_avg),
            escape(&row.over_under),
            escape(&row.team_points),
            escape(&row.ownership),
            escape(&row.game_time),
        ));
    }
    body.push_str("</table>\n</form>\n");
    page("Player Pool", &body)
}

/// The generated-lineups view.
pub fn lineups_page(lineups: &[Lineup], state: &FilterState) -> String {
    let mut body = String::new();
    body.push_str("<h1>Lineups</h1>\n<p><a href=\"/\">Back to player pool</a></p>\n");

    if lineups.is_empty() {
        body.push_str("<p>No lineups could be generated with the current selections.</p>\n");
        return page("Lineups", &body);
    }

    body.push_str(&format!(
        "<p>Showing {} of {} requested lineup(s).</p>\n",
        lineups.len(),
        state.num_lineups
    ));

    for (i, lineup) in lineups.iter().enumerate() {
        body.push_str(&format!("<h2>Lineup {}</h2>\n", i + 1));
        body.push_str(
            "<table>\n<tr><th>Slot</th><th>Name</th><th>Pos</th><th>Team</th>\
             <th>Salary</th><th>Adj Proj</th></tr>\n",
        );
        for (slot, player) in &lineup.slots {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr>\n",
                slot,
                escape(&player.name),
                escape(&display_positions(&player.positions)),
                escape(&player.team),
                player.salary,
                player.adjusted_projection,
            ));
        }
        body.push_str(&format!(
            "<tr><th colspan=\"4\">Total</th><th>{}</th><th>{:.2}</th></tr>\n</table>\n",
            lineup.total_salary(),
            lineup.total_projection(),
        ));
    }
    page("Lineups", &body)
}

/// Rendered when the projection feed cannot be loaded.
pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>Feed unavailable</h1>\n<p>{}</p>\n<p><a href=\"/\">Try again</a></p>\n",
        escape(message)
    );
    page("Feed unavailable", &body)
}
