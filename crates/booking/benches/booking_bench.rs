use booking::{BookingService, allocate};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use seat_store::{InMemorySeatStore, Seat, SeatId, UserId, VenueLayout};

fn coach_snapshot(booked_every: usize) -> Vec<Seat> {
    VenueLayout::coach()
        .seats()
        .enumerate()
        .map(|(i, p)| Seat {
            id: SeatId::new(i as i64 + 1),
            seat_number: p.seat_number,
            row_number: p.row_number,
            is_available: i % booked_every != 0,
        })
        .collect()
}

fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("booking/allocate");

    for booked_every in [2, 3, 80] {
        let snapshot = coach_snapshot(booked_every);
        group.bench_with_input(
            BenchmarkId::from_parameter(booked_every),
            &snapshot,
            |b, snapshot| {
                b.iter(|| allocate(snapshot, 4));
            },
        );
    }

    group.finish();
}

fn bench_book_and_cancel(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = rt.block_on(async {
        InMemorySeatStore::with_layout(&VenueLayout::coach())
            .await
            .unwrap()
    });
    let service = BookingService::new(store);
    let user = UserId::new(1);

    c.bench_function("booking/book_and_cancel", |b| {
        b.iter(|| {
            rt.block_on(async {
                let confirmation = service.book(user, 3).await.unwrap();
                let ids: Vec<_> = confirmation.assigned_seats.iter().map(|s| s.id).collect();
                service.cancel(user, &ids).await.unwrap();
            });
        });
    });
}

fn bench_fill_venue(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("booking/fill_coach", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemorySeatStore::with_layout(&VenueLayout::coach())
                    .await
                    .unwrap();
                let service = BookingService::new(store);
                for i in 1..=20 {
                    service.book(UserId::new(i), 4).await.unwrap();
                }
            });
        });
    });
}

criterion_group!(benches, bench_allocate, bench_book_and_cancel, bench_fill_venue);
criterion_main!(benches);
