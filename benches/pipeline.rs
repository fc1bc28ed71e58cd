use calc_session::{Session, evaluate_str};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for expression in ["3+4×2", "sqrt(16)+2^3", "(2+3)%×170!/ln(e)", "sin(π/4)^2+cos(π/4)^2"] {
        group.bench_function(expression, |b| {
            b.iter(|| evaluate_str(black_box(expression)))
        });
    }

    group.finish();
}

fn bench_session(c: &mut Criterion) {
    c.bench_function("session typing", |b| {
        b.iter(|| {
            let mut session = Session::default();
            for fragment in ["1", "2", "×", "(", "3", "+", "4", ")", "!"] {
                session.append(black_box(fragment));
            }
            session.calculate()
        })
    });
}

criterion_group!(benches, bench_evaluate, bench_session);
criterion_main!(benches);
