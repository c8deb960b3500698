use criterion::{black_box, criterion_group, criterion_main, Criterion};
use blockfall::core::geometry::transform_mask;
use blockfall::core::{BlockTable, EngineConfig, Grid, ROTATE_CW};
use blockfall::engine::{Action, Session};
use blockfall::types::{Color, Point};

fn bench_session_tick(c: &mut Criterion) {
    let mut session = Session::new(EngineConfig::default(), 12345).unwrap();

    c.bench_function("session_tick", |b| {
        b.iter(|| {
            if session.is_game_over() {
                session.restart(12345).unwrap();
            }
            session.tick().unwrap();
        })
    });
}

fn bench_transform_mask(c: &mut Criterion) {
    c.bench_function("transform_mask_8x8", |b| {
        b.iter(|| transform_mask(black_box(0x0102_0408_1020_4080), 8, ROTATE_CW))
    });
}

fn bench_can_place(c: &mut Criterion) {
    let grid = Grid::new(10, 20).unwrap();
    c.bench_function("can_place_t", |b| {
        b.iter(|| grid.can_place(3, black_box(0b000_111_010), Point::new(5, 10)))
    });
}

fn bench_resolve_rows(c: &mut Criterion) {
    c.bench_function("resolve_4_rows", |b| {
        b.iter(|| {
            let mut table = BlockTable::new(64);
            let mut grid = Grid::new(10, 20).unwrap();
            // Two I bars and two single cells per row fill the bottom 4 rows.
            for row in 16..20 {
                for x in [2, 6] {
                    // The I mask sits one lattice row above its position.
                    let id = table
                        .create(4, 0x00F0, Point::new(x, row + 1), Color::default())
                        .unwrap();
                    grid.commit(&mut table, id).unwrap();
                }
                for x in 8..10 {
                    let id = table
                        .create(1, 1, Point::new(x, row), Color::default())
                        .unwrap();
                    grid.commit(&mut table, id).unwrap();
                }
            }
            while grid.resolve_rows(&mut table).unwrap() > 0 {}
        })
    });
}

fn bench_hard_drop(c: &mut Criterion) {
    let mut session = Session::new(EngineConfig::default(), 12345).unwrap();

    c.bench_function("hard_drop", |b| {
        b.iter(|| {
            if session.is_game_over() {
                session.restart(12345).unwrap();
            }
            session.apply_action(Action::HardDrop).unwrap();
            while session.phase() == blockfall::engine::Phase::Clearing {
                session.tick().unwrap();
            }
        })
    });
}

criterion_group!(
    benches,
    bench_session_tick,
    bench_transform_mask,
    bench_can_place,
    bench_resolve_rows,
    bench_hard_drop
);
criterion_main!(benches);
