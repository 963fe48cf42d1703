use super::*;

/// Keys accepted by the name field and the character each one types.
const NAME_KEYS: [(KeyCode, char); 38] = [
    (KeyCode::KeyA, 'a'),
    (KeyCode::KeyB, 'b'),
    (KeyCode::KeyC, 'c'),
    (KeyCode::KeyD, 'd'),
    (KeyCode::KeyE, 'e'),
    (KeyCode::KeyF, 'f'),
    (KeyCode::KeyG, 'g'),
    (KeyCode::KeyH, 'h'),
    (KeyCode::KeyI, 'i'),
    (KeyCode::KeyJ, 'j'),
    (KeyCode::KeyK, 'k'),
    (KeyCode::KeyL, 'l'),
    (KeyCode::KeyM, 'm'),
    (KeyCode::KeyN, 'n'),
    (KeyCode::KeyO, 'o'),
    (KeyCode::KeyP, 'p'),
    (KeyCode::KeyQ, 'q'),
    (KeyCode::KeyR, 'r'),
    (KeyCode::KeyS, 's'),
    (KeyCode::KeyT, 't'),
    (KeyCode::KeyU, 'u'),
    (KeyCode::KeyV, 'v'),
    (KeyCode::KeyW, 'w'),
    (KeyCode::KeyX, 'x'),
    (KeyCode::KeyY, 'y'),
    (KeyCode::KeyZ, 'z'),
    (KeyCode::Digit0, '0'),
    (KeyCode::Digit1, '1'),
    (KeyCode::Digit2, '2'),
    (KeyCode::Digit3, '3'),
    (KeyCode::Digit4, '4'),
    (KeyCode::Digit5, '5'),
    (KeyCode::Digit6, '6'),
    (KeyCode::Digit7, '7'),
    (KeyCode::Digit8, '8'),
    (KeyCode::Digit9, '9'),
    (KeyCode::Space, ' '),
    (KeyCode::Minus, '-'),
];

/// `YYYY-MM-DD` (UTC) for a Unix timestamp.
pub fn format_date(unix_secs: u64) -> String {
    // Days-to-civil conversion on the proleptic Gregorian calendar.
    let days = (unix_secs / 86_400) as i64 + 719_468;
    let era = days.div_euclid(146_097);
    let doe = days.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    format!("{year:04}-{month:02}-{day:02}")
}

fn name_field_text(view: &LeaderboardView) -> String {
    format!("{}_", view.name_buffer)
}

/// Spawn the overlay over the frozen play area.
///
/// Layout:
/// ```text
/// ┌──────────────────────────────────────┐
/// │              TIME'S UP               │
/// │            Final score: 7            │
/// │   [ name field ______ ] [ SUBMIT ]   │
/// │   ( error banner, click to close )   │
/// │   #  NAME            SCORE   DATE    │
/// │   1  ada                 9   ...     │
/// │            [ PLAY AGAIN ]            │
/// └──────────────────────────────────────┘
/// ```
pub(super) fn setup_game_over(mut commands: Commands, view: Res<LeaderboardView>) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.78)),
            ZIndex(300),
            GameOverRoot,
        ))
        .with_children(|overlay| {
            overlay
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(32.0)),
                        row_gap: Val::Px(10.0),
                        border: UiRect::all(Val::Px(2.0)),
                        min_width: Val::Px(460.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.05, 0.05, 0.10)),
                    BorderColor::all(Color::srgb(0.98, 0.75, 0.14)),
                ))
                .with_children(|card| {
                    card.spawn(label("TIME'S UP", 44.0, title_color()));
                    card.spawn(label(
                        format!("Final score: {}", view.final_score),
                        22.0,
                        subtitle_color(),
                    ));

                    spacer(card, 6.0);
                    spawn_name_entry(card, &view);
                    spawn_error_banner(card, &view);
                    spacer(card, 6.0);

                    card.spawn((
                        Node {
                            flex_direction: FlexDirection::Column,
                            row_gap: Val::Px(2.0),
                            min_width: Val::Px(420.0),
                            ..default()
                        },
                        LeaderboardTable,
                    ))
                    .with_children(|table| spawn_table_rows(table, &view));

                    spacer(card, 8.0);

                    card.spawn((
                        Button,
                        Node {
                            width: Val::Px(220.0),
                            height: Val::Px(50.0),
                            justify_content: JustifyContent::Center,
                            align_items: AlignItems::Center,
                            border: UiRect::all(Val::Px(2.0)),
                            ..default()
                        },
                        BackgroundColor(play_again_bg()),
                        BorderColor::all(play_again_border()),
                        PlayAgainButton,
                    ))
                    .with_children(|btn| {
                        btn.spawn(label("PLAY AGAIN", 18.0, play_again_text()));
                    });

                    card.spawn(label(
                        "Type your name, Enter to submit, Esc to close errors",
                        12.0,
                        hint_color(),
                    ));
                });
        });
}

fn spawn_name_entry(card: &mut ChildSpawnerCommands<'_>, view: &LeaderboardView) {
    let visibility = if view.name_entry_open {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    card.spawn((
        Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            column_gap: Val::Px(10.0),
            ..default()
        },
        visibility,
        NameEntryRow,
    ))
    .with_children(|row| {
        row.spawn((
            Node {
                width: Val::Px(280.0),
                height: Val::Px(40.0),
                padding: UiRect::horizontal(Val::Px(8.0)),
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(field_bg()),
            BorderColor::all(submit_border()),
        ))
        .with_children(|field| {
            field.spawn((label(name_field_text(view), 18.0, row_color()), NameInputText));
        });

        row.spawn((
            Button,
            Node {
                width: Val::Px(120.0),
                height: Val::Px(40.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(submit_bg()),
            BorderColor::all(submit_border()),
            SubmitNameButton,
        ))
        .with_children(|btn| {
            btn.spawn(label("SUBMIT", 16.0, submit_text()));
        });
    });
}

fn spawn_error_banner(card: &mut ChildSpawnerCommands<'_>, view: &LeaderboardView) {
    let visibility = if view.error.is_some() {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    card.spawn((
        Button,
        Node {
            padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
            border: UiRect::all(Val::Px(1.0)),
            ..default()
        },
        BackgroundColor(error_bg()),
        BorderColor::all(error_border()),
        visibility,
        ErrorBanner,
    ))
    .with_children(|banner| {
        banner.spawn((
            label(view.error.clone().unwrap_or_default(), 14.0, error_text()),
            ErrorBannerText,
        ));
    });
}

fn table_row(
    table: &mut ChildSpawnerCommands<'_>,
    cells: [String; 4],
    color: Color,
) {
    const WIDTHS: [f32; 4] = [40.0, 200.0, 70.0, 110.0];
    table
        .spawn(Node {
            flex_direction: FlexDirection::Row,
            ..default()
        })
        .with_children(|row| {
            for (text, width) in cells.into_iter().zip(WIDTHS) {
                row.spawn(Node {
                    width: Val::Px(width),
                    ..default()
                })
                .with_children(|cell| {
                    cell.spawn(label(text, 15.0, color));
                });
            }
        });
}

fn spawn_table_rows(table: &mut ChildSpawnerCommands<'_>, view: &LeaderboardView) {
    table_row(
        table,
        ["#".into(), "NAME".into(), "SCORE".into(), "DATE".into()],
        subtitle_color(),
    );
    if view.entries.is_empty() {
        table.spawn(label("No scores yet", 15.0, hint_color()));
        return;
    }
    for (rank, entry) in view.entries.iter().enumerate() {
        let color = if view.is_own_entry(entry) {
            own_row_color()
        } else {
            podium_color(rank).unwrap_or_else(row_color)
        };
        table_row(table, row_cells(rank, entry), color);
    }
}

/// Rank column text; the top three get ordinal medals.
fn rank_label(rank: usize) -> String {
    match rank {
        0 => "1st".to_string(),
        1 => "2nd".to_string(),
        2 => "3rd".to_string(),
        _ => (rank + 1).to_string(),
    }
}

fn row_cells(rank: usize, entry: &LeaderboardEntry) -> [String; 4] {
    [
        rank_label(rank),
        entry.name.clone(),
        entry.score.to_string(),
        format_date(entry.created_at_unix),
    ]
}

/// Recursively despawn all game-over overlay entities.
pub(super) fn cleanup_game_over(mut commands: Commands, query: Query<Entity, With<GameOverRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

/// Type into the name buffer while name entry is open.
pub(super) fn name_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<GameConfig>,
    mut view: ResMut<LeaderboardView>,
) {
    if !view.name_entry_open {
        return;
    }
    let shift = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    let typed: String = NAME_KEYS
        .iter()
        .filter(|(key, _)| keys.just_pressed(*key))
        .map(|(_, ch)| if shift { ch.to_ascii_uppercase() } else { *ch })
        .collect();

    if keys.just_pressed(KeyCode::Backspace) {
        view.backspace();
    }
    if !typed.is_empty() {
        view.push_str(&typed, config.max_name_len);
    }
}

/// Handle Submit / Play Again / error-banner clicks and their key shortcuts.
#[allow(clippy::type_complexity)]
pub(super) fn game_over_button_system(
    submit_query: Query<&Interaction, (Changed<Interaction>, With<SubmitNameButton>)>,
    play_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<PlayAgainButton>)>,
    banner_query: Query<&Interaction, (Changed<Interaction>, With<ErrorBanner>)>,
    mut btn_text: Query<&mut TextColor>,
    keys: Res<ButtonInput<KeyCode>>,
    view: Res<LeaderboardView>,
    mut submit: MessageWriter<SubmitScoreRequest>,
    mut dismiss: MessageWriter<DismissError>,
    mut replay: MessageWriter<ReplayRequested>,
) {
    let enter = keys.just_pressed(KeyCode::Enter);

    let wants_submit =
        (enter && view.name_entry_open) || submit_query.iter().any(|i| *i == Interaction::Pressed);
    if wants_submit && view.name_entry_open {
        submit.write(SubmitScoreRequest {
            name: view.name_buffer.clone(),
        });
    }

    if keys.just_pressed(KeyCode::Escape) || banner_query.iter().any(|i| *i == Interaction::Pressed)
    {
        dismiss.write(DismissError);
    }

    let wants_play_again = (enter && !view.name_entry_open)
        || play_query.iter().any(|(i, _)| *i == Interaction::Pressed);
    if wants_play_again {
        replay.write(ReplayRequested);
        return;
    }

    for (interaction, children) in play_query.iter() {
        let color = match interaction {
            Interaction::Hovered => Color::WHITE,
            _ => play_again_text(),
        };
        for child in children.iter() {
            if let Ok(mut text_color) = btn_text.get_mut(child) {
                *text_color = TextColor(color);
            }
        }
    }
}

/// Mirror the leaderboard view into the overlay whenever it changes.
#[allow(clippy::type_complexity)]
pub(super) fn refresh_game_over_system(
    mut commands: Commands,
    view: Res<LeaderboardView>,
    mut name_text: Query<&mut Text, (With<NameInputText>, Without<ErrorBannerText>)>,
    mut error_text: Query<&mut Text, (With<ErrorBannerText>, Without<NameInputText>)>,
    mut entry_row: Query<&mut Visibility, (With<NameEntryRow>, Without<ErrorBanner>)>,
    mut banner: Query<&mut Visibility, (With<ErrorBanner>, Without<NameEntryRow>)>,
    table: Query<Entity, With<LeaderboardTable>>,
) {
    if !view.is_changed() {
        return;
    }

    for mut text in name_text.iter_mut() {
        *text = Text::new(name_field_text(&view));
    }
    for mut visibility in entry_row.iter_mut() {
        *visibility = if view.name_entry_open {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    for mut text in error_text.iter_mut() {
        *text = Text::new(view.error.clone().unwrap_or_default());
    }
    for mut visibility in banner.iter_mut() {
        *visibility = if view.error.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    for entity in table.iter() {
        commands
            .entity(entity)
            .despawn_related::<Children>()
            .with_children(|rows| spawn_table_rows(rows, &view));
    }
}
