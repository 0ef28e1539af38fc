use schema::{MoveData, MoveEffect, MoveQuirk};
use std::fmt::Write;

fn describe_effect(effect: MoveEffect) -> &'static str {
    match effect {
        MoveEffect::DefenseDown => "상대의 방어를 10 낮춘다. 제한 없이 중첩된다.",
        MoveEffect::Toxic => "상대를 맹독 상태로 만든다. 매 턴 종료 시 20의 피해를 입는다.",
        MoveEffect::Protect => {
            "상대의 다음 공격을 막는다. 연속 사용은 업그레이드 레벨당 10% 확률로만 성공한다."
        }
        MoveEffect::CureStatus => {
            "자신의 독을 치료한다. 플레이어는 업그레이드 레벨당 HP를 10 추가로 회복한다."
        }
    }
}

fn describe_quirk(quirk: MoveQuirk) -> &'static str {
    match quirk {
        MoveQuirk::MustRecharge => "사용 후 다음 턴은 반동으로 움직일 수 없다.",
        MoveQuirk::TargetImmune => "토게피는 노말 타입이라 효과가 없다.",
    }
}

/// Human-readable summary of a catalog entry, one fact per line.
pub fn describe_move(move_data: &MoveData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", move_data.name, move_data.move_type);

    match move_data.damage {
        Some(0) => {
            let _ = writeln!(out, "  위력: 0 (아무 효과도 없다)");
        }
        Some(damage) => {
            let _ = writeln!(out, "  위력: {}", damage);
        }
        None => {}
    }
    if let Some(heal) = move_data.heal {
        let _ = writeln!(out, "  회복: HP {}", heal);
    }
    if let Some(effect) = move_data.effect {
        let _ = writeln!(out, "  효과: {}", describe_effect(effect));
    }
    if let Some(quirk) = move_data.quirk {
        let _ = writeln!(out, "  특징: {}", describe_quirk(quirk));
    }
    let _ = write!(out, "  가중치: {}", move_data.weight);
    out
}
