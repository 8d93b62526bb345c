//! Benchmarks for regular-cell extraction, node sampling and a full frame.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use glam::{IVec3, Vec3};
use voxel_terrain::polygonizer::{polygonize_samples, sample_node};
use voxel_terrain::populator::{HeightGradientPopulator, SpherePopulator, VoxelPopulator};
use voxel_terrain::types::density;
use voxel_terrain::{
  sample_index, CameraSnapshot, ChunkKey, InMemoryMeshStore, LodConfig, NodeId, OctreeConfig,
  SampleBuffer, SparseVoxelOctree, TransvoxelPolygonizer,
};

/// Leaf key at the origin.
fn leaf_key() -> ChunkKey {
  ChunkKey {
    id: NodeId::ROOT,
    bottom_left: IVec3::ZERO,
    size_in_voxels: 16,
    mip_level: 0,
  }
}

/// Sphere lattice over the gutter-inclusive 19³ samples.
fn sphere_samples(center: f32, radius: f32) -> Box<SampleBuffer> {
  let mut samples = Box::new([127i8; voxel_terrain::constants::SAMPLE_VOLUME]);
  for z in -1..=17 {
    for y in -1..=17 {
      for x in -1..=17 {
        let p = Vec3::new(x as f32, y as f32, z as f32);
        let distance = (p - Vec3::splat(center)).length() - radius;
        samples[sample_index(x, y, z)] = density::to_storage(distance, 4.0, -127, 127);
      }
    }
  }
  samples
}

/// Several overlapping spheres, surface in most cells of the block.
fn blob_samples() -> Box<SampleBuffer> {
  let spheres = [
    (Vec3::new(5.0, 8.0, 8.0), 4.0),
    (Vec3::new(11.0, 8.0, 8.0), 4.0),
    (Vec3::new(8.0, 5.0, 8.0), 3.0),
    (Vec3::new(8.0, 11.0, 8.0), 3.0),
    (Vec3::new(8.0, 8.0, 8.0), 5.0),
  ];
  let mut samples = Box::new([127i8; voxel_terrain::constants::SAMPLE_VOLUME]);
  for z in -1..=17 {
    for y in -1..=17 {
      for x in -1..=17 {
        let p = Vec3::new(x as f32, y as f32, z as f32);
        let distance = spheres
          .iter()
          .map(|(center, radius)| (p - *center).length() - radius)
          .fold(f32::MAX, f32::min);
        samples[sample_index(x, y, z)] = density::to_storage(distance, 2.0, -127, 127);
      }
    }
  }
  samples
}

fn bench_polygonize_sphere(c: &mut Criterion) {
  let mut group = c.benchmark_group("polygonize_samples");

  for radius in [3.0, 5.0, 7.0] {
    let samples = sphere_samples(8.0, radius);
    group.bench_with_input(BenchmarkId::new("sphere", format!("r={}", radius)), &radius, |b, _| {
      b.iter_batched(
        || samples.clone(),
        |samples| black_box(polygonize_samples(samples, leaf_key())),
        BatchSize::SmallInput,
      )
    });
  }

  let blob = blob_samples();
  group.bench_function("5 spheres", |b| {
    b.iter_batched(
      || blob.clone(),
      |samples| black_box(polygonize_samples(samples, leaf_key())),
      BatchSize::SmallInput,
    )
  });

  group.finish();
}

fn bench_sample_node(c: &mut Criterion) {
  let mut tree = SparseVoxelOctree::with_heap_allocator(OctreeConfig::new(256)).unwrap();
  SpherePopulator::new(Vec3::splat(64.0), 20.0).populate(&mut tree);
  let index = tree.set_voxel_at(IVec3::splat(64), -127);
  let leaf = tree.find_node_from_index(index).unwrap();

  c.bench_function("voxels_for_node (leaf inside sphere)", |b| {
    b.iter(|| black_box(sample_node(leaf, &tree)))
  });
}

fn bench_frame(c: &mut Criterion) {
  let polygonizer = TransvoxelPolygonizer::default();
  let camera = CameraSnapshot::look_at(Vec3::new(128.0, 64.0, 400.0), Vec3::splat(128.0), Vec3::Y);
  let lod = LodConfig::default().with_min_viewport_area(0.05);

  c.bench_function("get_chunks_to_render (256³ terrain, cold)", |b| {
    b.iter_batched(
      || {
        let mut tree = SparseVoxelOctree::with_heap_allocator(OctreeConfig::new(256)).unwrap();
        HeightGradientPopulator::new(40.0).with_depth(64).populate(&mut tree);
        tree
      },
      |mut tree| {
        let mut store = InMemoryMeshStore::new();
        black_box(tree.get_chunks_to_render(&camera, &lod, &polygonizer, &mut store))
      },
      BatchSize::LargeInput,
    )
  });
}

criterion_group!(benches, bench_polygonize_sphere, bench_sample_node, bench_frame);
criterion_main!(benches);
